//! `PostgreSQL` store behaviour.
//!
//! These tests require a `PostgreSQL` database reachable through
//! `PHONEBOOK_TEST_DATABASE_URL`. Each test uses names unique to its run.
//!
//! Run with: cargo test -p phonebook-integration-tests -- --include-ignored

#![allow(clippy::unwrap_used)]

use phonebook_core::{City, PersonId, PersonName, Phone, PhoneFilter, Street, Username};
use phonebook_server::db::{self, RepositoryError, Stores};
use phonebook_server::models::NewPerson;
use phonebook_server::services::auth::TokenService;
use phonebook_server::services::events::EventBus;
use phonebook_server::services::rest::RestClient;
use phonebook_server::services::{AddPerson, AddressBook};
use secrecy::SecretString;
use sqlx::PgPool;
use url::Url;

async fn pool() -> PgPool {
    let url = std::env::var("PHONEBOOK_TEST_DATABASE_URL")
        .expect("PHONEBOOK_TEST_DATABASE_URL must be set");
    let pool = db::create_pool(&SecretString::from(url)).await.unwrap();
    db::run_migrations(&pool).await.unwrap();
    pool
}

/// A suffix that keeps names from colliding between runs.
fn unique() -> String {
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{nanos}")
}

fn new_person(name: &str, phone: Option<&str>) -> NewPerson {
    NewPerson {
        name: PersonName::parse(name).unwrap(),
        phone: phone.map(|p| Phone::parse(p).unwrap()),
        street: Street::parse("Tapiolankatu 5 A").unwrap(),
        city: City::parse("Espoo").unwrap(),
    }
}

#[tokio::test]
#[ignore = "Requires PHONEBOOK_TEST_DATABASE_URL"]
async fn test_person_round_trip_and_unique_name() {
    let stores = Stores::postgres(pool().await);
    let name = format!("Arto Hellas {}", unique());

    let created = stores
        .persons
        .create(new_person(&name, Some("040-123543")))
        .await
        .unwrap();
    let found = stores.persons.find_by_name(&name).await.unwrap().unwrap();
    assert_eq!(found, created);

    let err = stores
        .persons
        .create(new_person(&name, None))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::Conflict(_)));
}

#[tokio::test]
#[ignore = "Requires PHONEBOOK_TEST_DATABASE_URL"]
async fn test_update_phone_and_filters() {
    let stores = Stores::postgres(pool().await);
    let name = format!("Venla Ruuska {}", unique());
    let person = stores.persons.create(new_person(&name, None)).await.unwrap();

    let without = stores.persons.list(Some(PhoneFilter::No)).await.unwrap();
    assert!(without.iter().any(|p| p.id == person.id));

    let updated = stores
        .persons
        .update_phone(person.id, &Phone::parse("09-1234567").unwrap())
        .await
        .unwrap();
    assert_eq!(updated.phone.unwrap().as_str(), "09-1234567");

    let with = stores.persons.list(Some(PhoneFilter::Yes)).await.unwrap();
    assert!(with.iter().any(|p| p.id == person.id));
}

#[tokio::test]
#[ignore = "Requires PHONEBOOK_TEST_DATABASE_URL"]
async fn test_friends_keep_insertion_order() {
    let stores = Stores::postgres(pool().await);
    let run = unique();
    let first = stores
        .persons
        .create(new_person(&format!("Matti Luukkainen {run}"), None))
        .await
        .unwrap();
    let second = stores
        .persons
        .create(new_person(&format!("Arto Vihavainen {run}"), None))
        .await
        .unwrap();
    let user = stores
        .users
        .create(&Username::parse(&format!("user{run}")).unwrap())
        .await
        .unwrap();

    assert!(stores.users.append_friend(user.id, second.id).await.unwrap());
    assert!(stores.users.append_friend(user.id, first.id).await.unwrap());
    assert!(!stores.users.append_friend(user.id, second.id).await.unwrap());

    let loaded = stores.users.get_by_id(user.id).await.unwrap().unwrap();
    assert_eq!(loaded.friend_ids(), vec![second.id, first.id]);

    let err = stores
        .users
        .append_friend(user.id, PersonId::new(i32::MAX))
        .await
        .unwrap_err();
    assert!(matches!(err, RepositoryError::NotFound));
}

#[tokio::test]
#[ignore = "Requires PHONEBOOK_TEST_DATABASE_URL"]
async fn test_concurrent_add_person_keeps_every_friend() {
    let book = AddressBook::new(
        Stores::postgres(pool().await),
        TokenService::new(&SecretString::from("k9$Lm2!vQx7@Rt4#Wz8^Yb1&Nc5*Pd3e")),
        EventBus::new(16),
        RestClient::new(Url::parse("http://127.0.0.1:9").unwrap()).unwrap(),
        SecretString::from("secret"),
    );
    let run = unique();
    let user = book.create_user(&format!("user{run}")).await.unwrap();

    let input = |name: String| AddPerson {
        name,
        phone: None,
        street: "Tapiolankatu 5 A".to_string(),
        city: "Espoo".to_string(),
    };

    for round in 0..20 {
        let (a, b) = tokio::join!(
            book.add_person(Some(&user), input(format!("Person A {round} {run}"))),
            book.add_person(Some(&user), input(format!("Person B {round} {run}"))),
        );
        a.unwrap();
        b.unwrap();
    }

    let stored = book
        .stores()
        .users
        .get_by_id(user.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.friends.len(), 40);
}

#[tokio::test]
#[ignore = "Requires PHONEBOOK_TEST_DATABASE_URL"]
async fn test_ping() {
    let stores = Stores::postgres(pool().await);
    stores.persons.ping().await.unwrap();
}
