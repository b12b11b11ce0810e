//! Live updates.

use async_graphql::{Context, Result, Subscription};
use futures::{Stream, StreamExt};

use super::address_book;
use super::types::Person;

pub struct SubscriptionRoot;

#[Subscription]
impl SubscriptionRoot {
    /// Every contact added from now on, in the order they were added.
    async fn person_added(&self, ctx: &Context<'_>) -> Result<impl Stream<Item = Person>> {
        Ok(address_book(ctx)?.person_added().map(Person))
    }
}
