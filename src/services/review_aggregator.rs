// src/services/review_aggregator.rs
// DOCUMENTATION: Resolves the people and reviews around a listing for display
// PURPOSE: Replace declarative population with explicit batched lookups

use crate::db::{IdentityStore, ReviewStore};
use crate::errors::ListingsError;
use crate::models::{Identity, Listing, ListingView};
use std::collections::HashMap;
use std::sync::Arc;
use uuid::Uuid;

#[derive(Clone)]
pub struct ReviewAggregator {
    reviews: Arc<dyn ReviewStore>,
    identities: Arc<dyn IdentityStore>,
}

impl ReviewAggregator {
    pub fn new(reviews: Arc<dyn ReviewStore>, identities: Arc<dyn IdentityStore>) -> Self {
        Self {
            reviews,
            identities,
        }
    }

    /// Attach reviews (creation order, unfiltered) with their authors, plus the owner
    /// DOCUMENTATION: Two store round trips regardless of review count: one
    /// for the reviews, one batched identity lookup for owner and authors.
    /// Identities that no longer exist resolve to None.
    pub async fn attach_reviews(&self, listing: Listing) -> Result<ListingView, ListingsError> {
        let reviews = self.reviews.reviews_for_listing(listing.id).await?;

        let mut ids: Vec<Uuid> = reviews.iter().map(|r| r.author_id).collect();
        ids.push(listing.owner_id);
        ids.sort_unstable();
        ids.dedup();

        let identities: HashMap<Uuid, Identity> = self
            .identities
            .find_by_ids(&ids)
            .await?
            .into_iter()
            .map(|identity| (identity.id, identity))
            .collect();

        let owner = identities.get(&listing.owner_id).cloned();
        let reviews = reviews
            .iter()
            .map(|review| review.to_view(identities.get(&review.author_id).cloned()))
            .collect();

        Ok(ListingView {
            listing,
            owner,
            reviews,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{identity, listing, review, MemoryIdentityStore, MemoryReviewStore};

    #[tokio::test]
    async fn test_reviews_keep_creation_order_with_authors() {
        let alice = identity("alice");
        let bob = identity("bob");
        let owner = identity("owner");
        let listing = listing("Rome, Italy", "Italy", owner.id);

        let reviews = Arc::new(MemoryReviewStore::default());
        reviews.add(review(listing.id, bob.id, "second", 1));
        reviews.add(review(listing.id, alice.id, "first", 0));
        reviews.add(review(uuid::Uuid::new_v4(), alice.id, "elsewhere", 2));

        let identities = Arc::new(MemoryIdentityStore::with(vec![
            alice.clone(),
            bob.clone(),
            owner.clone(),
        ]));

        let view = ReviewAggregator::new(reviews, identities.clone())
            .attach_reviews(listing)
            .await
            .unwrap();

        assert_eq!(view.owner, Some(owner));
        let bodies: Vec<&str> = view.reviews.iter().map(|r| r.body.as_str()).collect();
        assert_eq!(bodies, vec!["first", "second"]);
        assert_eq!(view.reviews[0].author, Some(alice));
        assert_eq!(view.reviews[1].author, Some(bob));
        assert_eq!(identities.batch_calls(), 1);
    }

    #[tokio::test]
    async fn test_dangling_identities_resolve_to_none() {
        let listing = listing("Paris, France", "France", Uuid::new_v4());
        let reviews = Arc::new(MemoryReviewStore::default());
        reviews.add(review(listing.id, Uuid::new_v4(), "ghost", 0));

        let view = ReviewAggregator::new(reviews, Arc::new(MemoryIdentityStore::default()))
            .attach_reviews(listing)
            .await
            .unwrap();

        assert!(view.owner.is_none());
        assert_eq!(view.reviews.len(), 1);
        assert!(view.reviews[0].author.is_none());
    }
}
