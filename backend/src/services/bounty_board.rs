//! # Bounty Board Service
//!
//! Public postings that hitters sign up for until the board is full or the
//! poster closes it.
//!
//! ## Sign-up Rules
//!
//! ```text
//! sign_up(bounty)
//!      │
//!      ├── status == Completed        ──► BountyError::Ended
//!      ├── participants >= capacity   ──► BountyError::Full
//!      └── participants += 1
//! ```
//!
//! `participants <= max_participants` holds after every call.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::AppConfig;
use crate::models::CreateBountyRequest;
use crate::store::queries;
use crate::store::{Bounty, BountyStatus, Store, StoreError};
use crate::utils::{format_yuan, truncate_string, MAX_AMOUNT};

use super::DescriptionGenerator;

/// Errors that can occur on the bounty board.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BountyError {
    #[error("Bounty {0} is full")]
    Full(String),

    #[error("Bounty {0} has ended")]
    Ended(String),

    /// Invalid input provided.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// The bounty board service.
#[derive(Clone)]
pub struct BountyBoard {
    store: Store,
    config: AppConfig,
    generator: Arc<dyn DescriptionGenerator>,
}

impl BountyBoard {
    pub fn new(store: Store, config: AppConfig, generator: Arc<dyn DescriptionGenerator>) -> Self {
        Self {
            store,
            config,
            generator,
        }
    }

    pub async fn list(&self) -> Vec<Bounty> {
        self.store.read().await.bounties.clone()
    }

    /// Take one place on a bounty.
    pub async fn sign_up(&self, bounty_id: &str) -> Result<Bounty, BountyError> {
        let mut data = self.store.write().await;
        let bounty = queries::bounty_mut(&mut data, bounty_id)?;

        if bounty.status != BountyStatus::InProgress {
            debug!("Sign-up rejected, bounty {} has ended", bounty_id);
            return Err(BountyError::Ended(bounty_id.to_string()));
        }
        if bounty.is_full() {
            debug!("Sign-up rejected, bounty {} is full", bounty_id);
            return Err(BountyError::Full(bounty_id.to_string()));
        }

        bounty.participants += 1;
        info!(
            "Sign-up on bounty {} ({}/{})",
            bounty_id, bounty.participants, bounty.max_participants
        );
        Ok(bounty.clone())
    }

    /// Post a new bounty.
    ///
    /// Capacity defaults to `DEFAULT_BOUNTY_CAPACITY` when not given.
    pub async fn create_bounty(&self, request: CreateBountyRequest) -> Result<Bounty, BountyError> {
        let title = request.title.trim();
        if title.is_empty() {
            return Err(BountyError::InvalidInput("title is required".into()));
        }
        if request.reward <= 0 || request.reward > MAX_AMOUNT {
            return Err(BountyError::InvalidInput(format!(
                "reward must be between 1 and {}",
                MAX_AMOUNT
            )));
        }
        let max_participants = request
            .max_participants
            .unwrap_or(self.config.default_bounty_capacity);
        if max_participants == 0 {
            return Err(BountyError::InvalidInput("maxParticipants must be greater than 0".into()));
        }

        let mut data = self.store.write().await;
        let bounty = Bounty {
            id: queries::allocate_id(&data, "B"),
            title: title.to_string(),
            description: request.description,
            reward: request.reward,
            status: BountyStatus::InProgress,
            participants: 0,
            max_participants,
            platform: request.platform,
        };

        info!(
            "Bounty {} posted: \"{}\" reward {}",
            bounty.id,
            truncate_string(&bounty.title, 24),
            format_yuan(bounty.reward)
        );

        data.bounties.push(bounty.clone());
        Ok(bounty)
    }

    /// `InProgress` → `Completed`.
    pub async fn close_bounty(&self, bounty_id: &str) -> Result<Bounty, BountyError> {
        let mut data = self.store.write().await;
        let bounty = queries::bounty_mut(&mut data, bounty_id)?;

        if bounty.status == BountyStatus::Completed {
            return Err(BountyError::Ended(bounty_id.to_string()));
        }
        bounty.status = BountyStatus::Completed;

        info!("Bounty {} closed with {} participants", bounty_id, bounty.participants);
        Ok(bounty.clone())
    }

    /// Description suggestion for a title. Runs outside the store lock.
    pub async fn generate_description(&self, title: &str) -> Result<String, BountyError> {
        let title = title.trim();
        if title.is_empty() {
            return Err(BountyError::InvalidInput("enter a title first".into()));
        }

        let description = self.generator.generate(title).await;
        debug!("Generated description: {}", truncate_string(&description, 40));
        Ok(description)
    }

    pub fn description_ai_configured(&self) -> bool {
        self.generator.is_configured()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::description_generator::StaticDescriptionGenerator;
    use crate::store::seed;

    fn board() -> BountyBoard {
        BountyBoard::new(
            Store::with_data(seed::mock_data()),
            AppConfig::default(),
            Arc::new(StaticDescriptionGenerator("速来！".into())),
        )
    }

    fn request(title: &str, reward: i64) -> CreateBountyRequest {
        CreateBountyRequest {
            title: title.into(),
            description: String::new(),
            reward,
            max_participants: None,
            platform: None,
        }
    }

    #[tokio::test]
    async fn test_sign_up_until_full() {
        let board = board();

        // B2 is 4/5
        let bounty = board.sign_up("B2").await.unwrap();
        assert_eq!(bounty.participants, 5);

        assert_eq!(board.sign_up("B2").await.unwrap_err(), BountyError::Full("B2".into()));
        let b2 = board.list().await.into_iter().find(|b| b.id == "B2").unwrap();
        assert_eq!(b2.participants, 5);
    }

    #[tokio::test]
    async fn test_full_bounty_unchanged() {
        let board = board();
        let created = board
            .create_bounty(CreateBountyRequest {
                max_participants: Some(1),
                ..request("单人任务", 1_000)
            })
            .await
            .unwrap();

        board.sign_up(&created.id).await.unwrap();
        assert_eq!(
            board.sign_up(&created.id).await.unwrap_err(),
            BountyError::Full(created.id.clone())
        );
    }

    #[tokio::test]
    async fn test_ended_bounty_rejects_sign_up() {
        let board = board();
        assert_eq!(board.sign_up("B3").await.unwrap_err(), BountyError::Ended("B3".into()));

        board.close_bounty("B1").await.unwrap();
        assert_eq!(board.sign_up("B1").await.unwrap_err(), BountyError::Ended("B1".into()));
        assert!(board.close_bounty("B1").await.is_err());
    }

    #[tokio::test]
    async fn test_create_defaults() {
        let board = board();
        let bounty = board.create_bounty(request("  五排缺辅助  ", 5_000)).await.unwrap();

        assert_eq!(bounty.title, "五排缺辅助");
        assert_eq!(bounty.participants, 0);
        assert_eq!(bounty.max_participants, 5);
        assert_eq!(bounty.status, BountyStatus::InProgress);
        assert!(bounty.id.starts_with('B'));
    }

    #[tokio::test]
    async fn test_create_validation() {
        let board = board();
        assert!(matches!(
            board.create_bounty(request(" ", 5_000)).await,
            Err(BountyError::InvalidInput(_))
        ));
        assert!(matches!(
            board.create_bounty(request("x", 0)).await,
            Err(BountyError::InvalidInput(_))
        ));
        assert!(matches!(
            board.create_bounty(request("x", MAX_AMOUNT + 1)).await,
            Err(BountyError::InvalidInput(_))
        ));
        assert!(board.create_bounty(request("x", MAX_AMOUNT)).await.is_ok());
    }

    #[tokio::test]
    async fn test_generate_description() {
        let board = board();
        assert_eq!(board.generate_description("开荒").await.unwrap(), "速来！");
        assert_eq!(
            board.generate_description("   ").await.unwrap_err(),
            BountyError::InvalidInput("enter a title first".into())
        );
    }
}
