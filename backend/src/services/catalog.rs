//! # Back-office Catalog Service
//!
//! Admin data operations over products, users, teams, complaints,
//! announcements and ad slots.
//!
//! ## Operations
//!
//! | Collection | Operations |
//! |------------|------------|
//! | products | list, get, create, replace, delete |
//! | users | list, get, edit, toggle status, delete |
//! | teams | list, create, update, toggle status, delete |
//! | complaints | list, create, set status |
//! | announcements | list, create, replace, delete |
//! | ad slots | list, update |
//! | settings | get, replace |
//!
//! New records get a `prefix + millisecond timestamp` id (`P`, `T`, `C`, `A`).

use chrono::Utc;
use tracing::info;

use crate::models::{AdSlotUpdate, NewAnnouncement, NewComplaint, NewProduct, NewTeam, UserProfileUpdate};
use crate::store::queries;
use crate::utils::MAX_AMOUNT;
use crate::store::{
    AccountStatus, AdSlot, Announcement, Complaint, ComplaintStatus, LevelSetting, PlatformSettings, Product,
    Store, StoreData, StoreError, Team, User,
};

/// Default platform fee on new products, in percent.
pub const DEFAULT_SERVICE_FEE: u8 = 5;

/// Errors that can occur in back-office operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// A submitted form failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

fn require(value: &str, field: &str) -> Result<(), CatalogError> {
    if value.trim().is_empty() {
        return Err(CatalogError::Validation(format!("{} is required", field)));
    }
    Ok(())
}

/// The back-office service.
#[derive(Clone)]
pub struct Catalog {
    store: Store,
}

impl Catalog {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    // ==========================================
    // PRODUCTS
    // ==========================================

    /// Products in a category; `None` or "全部" lists all.
    pub async fn products(&self, category: Option<&str>) -> Vec<Product> {
        let data = self.store.read().await;
        queries::products_in_category(&data, category)
    }

    pub async fn product(&self, id: &str) -> Result<Product, CatalogError> {
        let data = self.store.read().await;
        Ok(queries::product(&data, id)?.clone())
    }

    pub async fn create_product(&self, form: NewProduct) -> Result<Product, CatalogError> {
        let service_fee = validate_product(&form)?;

        let mut data = self.store.write().await;
        let id = queries::allocate_id(&data, "P");
        let product = product_from_form(id, 0, form, service_fee);

        info!("Product {} created: {}", product.id, product.name);
        data.products.push(product.clone());
        Ok(product)
    }

    /// Replace a product with the submitted form, keeping its id and sales.
    pub async fn replace_product(&self, id: &str, form: NewProduct) -> Result<Product, CatalogError> {
        let service_fee = validate_product(&form)?;

        let mut data = self.store.write().await;
        let sales = queries::product(&data, id)?.sales;
        let product = product_from_form(id.to_string(), sales, form, service_fee);
        queries::replace_product(&mut data, product.clone())?;

        info!("Product {} replaced", id);
        Ok(product)
    }

    pub async fn delete_product(&self, id: &str) -> Result<Product, CatalogError> {
        let mut data = self.store.write().await;
        let removed = queries::remove_product(&mut data, id)?;
        info!("Product {} deleted", id);
        Ok(removed)
    }

    // ==========================================
    // USERS
    // ==========================================

    pub async fn users(&self) -> Vec<User> {
        self.store.read().await.users.clone()
    }

    /// Overwrite name, email, role and status.
    pub async fn edit_user(&self, id: &str, update: UserProfileUpdate) -> Result<User, CatalogError> {
        require(&update.name, "name")?;
        if !update.email.contains('@') {
            return Err(CatalogError::Validation(format!("invalid email: {}", update.email)));
        }

        let mut data = self.store.write().await;
        let user = queries::user_mut(&mut data, id)?;
        user.name = update.name;
        user.email = update.email;
        user.role = update.role;
        user.status = update.status;

        info!("User {} edited", id);
        Ok(user.clone())
    }

    /// Active ⇄ Frozen.
    pub async fn toggle_user_status(&self, id: &str) -> Result<User, CatalogError> {
        let mut data = self.store.write().await;
        let user = queries::user_mut(&mut data, id)?;
        user.status = user.status.toggled();

        info!("User {} is now {:?}", id, user.status);
        Ok(user.clone())
    }

    pub async fn delete_user(&self, id: &str) -> Result<User, CatalogError> {
        let mut data = self.store.write().await;
        let removed = queries::remove_user(&mut data, id)?;
        info!("User {} deleted", id);
        Ok(removed)
    }

    // ==========================================
    // TEAMS
    // ==========================================

    pub async fn teams(&self) -> Vec<Team> {
        self.store.read().await.teams.clone()
    }

    pub async fn create_team(&self, form: NewTeam) -> Result<Team, CatalogError> {
        validate_team(&form)?;

        let mut data = self.store.write().await;
        let team = Team {
            id: queries::allocate_id(&data, "T"),
            name: form.name,
            leader_name: form.leader_name,
            leader_id: form.leader_id,
            member_count: 1,
            status: AccountStatus::Active,
            created_at: Utc::now(),
        };

        info!("Team {} created: {}", team.id, team.name);
        data.teams.push(team.clone());
        Ok(team)
    }

    /// Update name and leader; members, status and creation time stay.
    pub async fn update_team(&self, id: &str, form: NewTeam) -> Result<Team, CatalogError> {
        validate_team(&form)?;

        let mut data = self.store.write().await;
        let team = queries::team_mut(&mut data, id)?;
        team.name = form.name;
        team.leader_name = form.leader_name;
        team.leader_id = form.leader_id;

        info!("Team {} updated", id);
        Ok(team.clone())
    }

    pub async fn toggle_team_status(&self, id: &str) -> Result<Team, CatalogError> {
        let mut data = self.store.write().await;
        let team = queries::team_mut(&mut data, id)?;
        team.status = team.status.toggled();

        info!("Team {} is now {:?}", id, team.status);
        Ok(team.clone())
    }

    pub async fn delete_team(&self, id: &str) -> Result<Team, CatalogError> {
        let mut data = self.store.write().await;
        let removed = queries::remove_team(&mut data, id)?;
        info!("Team {} deleted", id);
        Ok(removed)
    }

    // ==========================================
    // COMPLAINTS
    // ==========================================

    pub async fn complaints(&self) -> Vec<Complaint> {
        self.store.read().await.complaints.clone()
    }

    /// File a complaint. Every field is required.
    pub async fn create_complaint(&self, form: NewComplaint) -> Result<Complaint, CatalogError> {
        require(&form.order_id, "orderId")?;
        require(&form.user_id, "userId")?;
        require(&form.user_name, "userName")?;
        require(&form.subject, "subject")?;
        require(&form.details, "details")?;

        let mut data = self.store.write().await;
        let complaint = Complaint {
            id: queries::allocate_id(&data, "C"),
            order_id: form.order_id,
            user_id: form.user_id,
            user_name: form.user_name,
            subject: form.subject,
            details: form.details,
            status: ComplaintStatus::Pending,
            created_at: Utc::now(),
        };

        info!("Complaint {} filed on order {}", complaint.id, complaint.order_id);
        data.complaints.push(complaint.clone());
        Ok(complaint)
    }

    pub async fn set_complaint_status(
        &self,
        id: &str,
        status: ComplaintStatus,
    ) -> Result<Complaint, CatalogError> {
        let mut data = self.store.write().await;
        let complaint = queries::complaint_mut(&mut data, id)?;
        complaint.status = status;

        info!("Complaint {} set to {:?}", id, status);
        Ok(complaint.clone())
    }

    // ==========================================
    // ANNOUNCEMENTS
    // ==========================================

    pub async fn announcements(&self) -> Vec<Announcement> {
        self.store.read().await.announcements.clone()
    }

    pub async fn create_announcement(&self, form: NewAnnouncement) -> Result<Announcement, CatalogError> {
        require(&form.content, "content")?;

        let mut data = self.store.write().await;
        let announcement = Announcement {
            id: queries::allocate_id(&data, "A"),
            content: form.content,
            created_at: Utc::now(),
            is_active: form.is_active.unwrap_or(true),
        };

        info!("Announcement {} created", announcement.id);
        data.announcements.push(announcement.clone());
        Ok(announcement)
    }

    /// Replace content and active flag; the creation time stays.
    pub async fn replace_announcement(
        &self,
        id: &str,
        form: NewAnnouncement,
    ) -> Result<Announcement, CatalogError> {
        require(&form.content, "content")?;

        let mut data = self.store.write().await;
        let announcement = queries::announcement_mut(&mut data, id)?;
        announcement.content = form.content;
        if let Some(active) = form.is_active {
            announcement.is_active = active;
        }

        info!("Announcement {} replaced", id);
        Ok(announcement.clone())
    }

    pub async fn delete_announcement(&self, id: &str) -> Result<Announcement, CatalogError> {
        let mut data = self.store.write().await;
        let removed = queries::remove_announcement(&mut data, id)?;
        info!("Announcement {} deleted", id);
        Ok(removed)
    }

    // ==========================================
    // AD SLOTS
    // ==========================================

    pub async fn ad_slots(&self) -> Vec<AdSlot> {
        self.store.read().await.ad_slots.clone()
    }

    pub async fn update_ad_slot(&self, id: &str, update: AdSlotUpdate) -> Result<AdSlot, CatalogError> {
        let mut data = self.store.write().await;
        let slot = queries::ad_slot_mut(&mut data, id)?;
        slot.content = update.content;
        slot.link = update.link;

        info!("Ad slot {} updated", id);
        Ok(slot.clone())
    }

    // ==========================================
    // SETTINGS
    // ==========================================

    pub async fn settings(&self) -> PlatformSettings {
        self.store.read().await.settings.clone()
    }

    /// Swap in a whole new settings record. Nothing changes on a failed check.
    pub async fn replace_settings(&self, settings: PlatformSettings) -> Result<PlatformSettings, CatalogError> {
        let mut data = self.store.write().await;
        validate_settings(&data, &settings)?;
        data.settings = settings.clone();

        info!(
            "Settings replaced: {} identities, {} hitter levels, {} boss levels, withdrawal fee {}%",
            settings.identities.len(),
            settings.hitter_levels.len(),
            settings.boss_levels.len(),
            settings.withdrawal_fee
        );
        Ok(settings)
    }
}

/// Check a product form and resolve its service fee.
fn validate_product(form: &NewProduct) -> Result<u8, CatalogError> {
    require(&form.name, "name")?;
    require(&form.category, "category")?;
    if form.price <= 0 || form.price > MAX_AMOUNT {
        return Err(CatalogError::Validation(format!(
            "price must be between 1 and {}",
            MAX_AMOUNT
        )));
    }

    let fee = form.service_fee.unwrap_or(DEFAULT_SERVICE_FEE);
    if !(1..=50).contains(&fee) {
        return Err(CatalogError::Validation(format!(
            "serviceFee must be between 1 and 50, got {}",
            fee
        )));
    }
    Ok(fee)
}

fn validate_settings(data: &StoreData, settings: &PlatformSettings) -> Result<(), CatalogError> {
    if settings.withdrawal_fee > 100 {
        return Err(CatalogError::Validation(format!(
            "withdrawalFee must be between 0 and 100, got {}",
            settings.withdrawal_fee
        )));
    }

    let naming = &settings.naming;
    for (value, field) in [
        (&naming.platform_name, "platformName"),
        (&naming.home_module, "homeModule"),
        (&naming.category_module, "categoryModule"),
        (&naming.bar_module, "barModule"),
        (&naming.profile_module, "profileModule"),
        (&naming.boss_role, "bossRole"),
        (&naming.hitter_role, "hitterRole"),
    ] {
        require(value, field)?;
    }

    for (i, setting) in settings.identities.iter().enumerate() {
        require(&setting.name, "identity name")?;
        if settings.identities[..i].iter().any(|s| s.identity == setting.identity) {
            return Err(CatalogError::Validation(format!(
                "identity {:?} is configured twice",
                setting.identity
            )));
        }
        if let Some(product_id) = &setting.required_product_id {
            queries::product(data, product_id)?;
        }
    }

    validate_levels(&settings.hitter_levels, "hitterLevels")?;
    validate_levels(&settings.boss_levels, "bossLevels")
}

/// Names present, incomes in range and non-decreasing, colors `#RRGGBB`.
fn validate_levels(levels: &[LevelSetting], table: &str) -> Result<(), CatalogError> {
    let mut floor = 0;
    for level in levels {
        require(&level.name, &format!("{} name", table))?;
        if !(floor..=MAX_AMOUNT).contains(&level.required_income) {
            return Err(CatalogError::Validation(format!(
                "{}: requiredIncome of {} must be between {} and {}",
                table, level.name, floor, MAX_AMOUNT
            )));
        }
        floor = level.required_income;

        if let Some(color) = &level.halo_color {
            let hex = color.strip_prefix('#').unwrap_or("");
            if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(CatalogError::Validation(format!(
                    "{}: haloColor {:?} is not #RRGGBB",
                    table, color
                )));
            }
        }
    }
    Ok(())
}

fn validate_team(form: &NewTeam) -> Result<(), CatalogError> {
    require(&form.name, "name")?;
    require(&form.leader_name, "leaderName")?;
    require(&form.leader_id, "leaderId")
}

fn product_from_form(id: String, sales: u32, form: NewProduct, service_fee: u8) -> Product {
    Product {
        id,
        name: form.name,
        price: form.price,
        images: form.images,
        sales,
        category: form.category,
        description: form.description,
        badge: form.badge,
        platform: form.platform,
        special_type: form.special_type,
        grants_identity: form.grants_identity,
        service_fee: Some(service_fee),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{seed, HitterIdentity, UserRole};

    fn catalog() -> Catalog {
        Catalog::new(Store::with_data(seed::mock_data()))
    }

    fn form(name: &str, price: i64, fee: Option<u8>) -> NewProduct {
        NewProduct {
            name: name.into(),
            price,
            category: "技能陪练".into(),
            description: String::new(),
            images: vec![],
            badge: None,
            platform: None,
            special_type: None,
            grants_identity: None,
            service_fee: fee,
        }
    }

    #[tokio::test]
    async fn test_create_product_defaults() {
        let catalog = catalog();
        let product = catalog.create_product(form("夜间陪练", 3_000, None)).await.unwrap();

        assert!(product.id.starts_with('P'));
        assert_eq!(product.sales, 0);
        assert_eq!(product.service_fee, Some(DEFAULT_SERVICE_FEE));
        assert_eq!(catalog.product(&product.id).await.unwrap(), product);
    }

    #[tokio::test]
    async fn test_product_validation() {
        let catalog = catalog();
        for bad in [
            form("", 100, None),
            form("x", 0, None),
            form("x", 100, Some(0)),
            form("x", 100, Some(51)),
            form("x", MAX_AMOUNT + 1, None),
            form("x", i64::MAX / 10, None),
        ] {
            assert!(matches!(
                catalog.create_product(bad).await,
                Err(CatalogError::Validation(_))
            ));
        }
    }

    #[tokio::test]
    async fn test_price_upper_bound_accepted() {
        let catalog = catalog();
        let product = catalog.create_product(form("包年陪练", MAX_AMOUNT, Some(50))).await.unwrap();
        assert_eq!(product.price, MAX_AMOUNT);

        assert!(matches!(
            catalog.replace_product(&product.id, form("包年陪练", i64::MAX, None)).await,
            Err(CatalogError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_replace_keeps_sales() {
        let catalog = catalog();
        let before = catalog.product("P1").await.unwrap();

        let replaced = catalog.replace_product("P1", form("改名陪练", 6_000, Some(8))).await.unwrap();
        assert_eq!(replaced.sales, before.sales);
        assert_eq!(replaced.price, 6_000);
        assert_eq!(replaced.service_fee, Some(8));

        assert!(matches!(
            catalog.replace_product("P404", form("x", 1, None)).await,
            Err(CatalogError::Store(StoreError::NotFound { .. }))
        ));
    }

    #[tokio::test]
    async fn test_category_filter() {
        let catalog = catalog();
        let all = catalog.products(Some("全部")).await;
        assert_eq!(all.len(), catalog.products(None).await.len());
        assert!(catalog
            .products(Some("段位提升"))
            .await
            .iter()
            .all(|p| p.category == "段位提升"));
    }

    #[tokio::test]
    async fn test_user_toggle_and_edit() {
        let catalog = catalog();

        let frozen = catalog.toggle_user_status("U1").await.unwrap();
        assert_eq!(frozen.status, AccountStatus::Frozen);
        let active = catalog.toggle_user_status("U1").await.unwrap();
        assert_eq!(active.status, AccountStatus::Active);

        let edited = catalog
            .edit_user(
                "U1",
                UserProfileUpdate {
                    name: "新名字".into(),
                    email: "new@example.com".into(),
                    role: UserRole::Admin,
                    status: AccountStatus::Active,
                },
            )
            .await
            .unwrap();
        assert_eq!(edited.name, "新名字");
        assert_eq!(edited.role, UserRole::Admin);
        // ledger untouched
        assert_eq!(edited.balance, active.balance);
    }

    #[tokio::test]
    async fn test_team_lifecycle() {
        let catalog = catalog();
        let team = catalog
            .create_team(NewTeam {
                name: "新车队".into(),
                leader_name: "大神_001".into(),
                leader_id: "U2".into(),
            })
            .await
            .unwrap();
        assert_eq!(team.member_count, 1);
        assert_eq!(team.status, AccountStatus::Active);

        let toggled = catalog.toggle_team_status(&team.id).await.unwrap();
        assert_eq!(toggled.status, AccountStatus::Frozen);

        catalog.delete_team(&team.id).await.unwrap();
        assert!(catalog.teams().await.iter().all(|t| t.id != team.id));
    }

    #[tokio::test]
    async fn test_complaint_requires_all_fields() {
        let catalog = catalog();
        let mut complaint = NewComplaint {
            order_id: "O1".into(),
            user_id: "U1".into(),
            user_name: "玩家_8888".into(),
            subject: "迟到".into(),
            details: String::new(),
        };
        assert!(catalog.create_complaint(complaint.clone()).await.is_err());

        complaint.details = "迟到半小时".into();
        let created = catalog.create_complaint(complaint).await.unwrap();
        assert_eq!(created.status, ComplaintStatus::Pending);

        let resolved = catalog
            .set_complaint_status(&created.id, ComplaintStatus::Resolved)
            .await
            .unwrap();
        assert_eq!(resolved.status, ComplaintStatus::Resolved);
    }

    #[tokio::test]
    async fn test_announcements_and_ad_slots() {
        let catalog = catalog();
        let created = catalog
            .create_announcement(NewAnnouncement {
                content: "周末双倍奖励".into(),
                is_active: None,
            })
            .await
            .unwrap();
        assert!(created.is_active);

        catalog.delete_announcement(&created.id).await.unwrap();
        assert!(catalog.delete_announcement(&created.id).await.is_err());

        let slot = catalog
            .update_ad_slot(
                "ad-slot-1",
                AdSlotUpdate {
                    content: "新广告".into(),
                    link: "https://example.com".into(),
                },
            )
            .await
            .unwrap();
        assert_eq!(slot.content, "新广告");
    }

    #[tokio::test]
    async fn test_default_settings() {
        let settings = catalog().settings().await;
        assert_eq!(settings.withdrawal_fee, 5);
        assert_eq!(settings.naming.platform_name, "俱乐部平台");
        assert_eq!(settings.naming.hitter_role, "打手");

        let vip = settings
            .identities
            .iter()
            .find(|s| s.identity == HitterIdentity::Vip)
            .unwrap();
        assert_eq!(vip.required_product_id.as_deref(), Some("P8"));

        // seed users sit on configured rungs
        assert!(settings.hitter_levels.iter().any(|l| l.name == "大师打手"));
        assert!(settings.boss_levels.iter().any(|l| l.name == "黄金老板"));
    }

    #[tokio::test]
    async fn test_replace_settings() {
        let catalog = catalog();
        let mut settings = catalog.settings().await;
        settings.withdrawal_fee = 0;
        settings.naming.bar_module = "大厅".into();
        settings.hitter_levels.push(LevelSetting {
            name: "殿堂打手".into(),
            required_income: MAX_AMOUNT,
            halo_color: Some("#ff00AA".into()),
        });

        let saved = catalog.replace_settings(settings.clone()).await.unwrap();
        assert_eq!(saved, settings);
        assert_eq!(catalog.settings().await, settings);

        settings.withdrawal_fee = 100;
        assert_eq!(catalog.replace_settings(settings).await.unwrap().withdrawal_fee, 100);
    }

    #[tokio::test]
    async fn test_settings_validation() {
        let catalog = catalog();
        let base = catalog.settings().await;

        let mut fee = base.clone();
        fee.withdrawal_fee = 101;

        let mut naming = base.clone();
        naming.naming.boss_role = "  ".into();

        let mut duplicate = base.clone();
        duplicate.identities.push(duplicate.identities[0].clone());

        let mut descending = base.clone();
        descending.boss_levels[2].required_income = 10;

        let mut negative = base.clone();
        negative.hitter_levels[0].required_income = -1;

        let mut too_high = base.clone();
        too_high.hitter_levels.last_mut().unwrap().required_income = MAX_AMOUNT + 1;

        let mut color = base.clone();
        color.hitter_levels[1].halo_color = Some("blue".into());

        for bad in [fee, naming, duplicate, descending, negative, too_high, color] {
            assert!(matches!(
                catalog.replace_settings(bad).await,
                Err(CatalogError::Validation(_))
            ));
        }

        let mut missing_product = base.clone();
        missing_product.identities[0].required_product_id = Some("P404".into());
        assert!(matches!(
            catalog.replace_settings(missing_product).await,
            Err(CatalogError::Store(StoreError::NotFound { .. }))
        ));

        assert_eq!(catalog.settings().await, base);
    }
}
