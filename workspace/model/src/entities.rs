//! This file serves as the root for all SeaORM entity modules.
//! We define the data models for the academy portal here: the membership
//! admission workflow plus the content the academy publishes.

pub mod achievement;
pub mod admission;
pub mod branch;
pub mod gallery_item;
pub mod notice;
pub mod payment;
pub mod user;

pub mod prelude {
    //! A prelude module for easy importing of all entities.
    pub use super::achievement::Entity as Achievement;
    pub use super::admission::Entity as Admission;
    pub use super::branch::Entity as Branch;
    pub use super::gallery_item::Entity as GalleryItem;
    pub use super::notice::Entity as Notice;
    pub use super::payment::Entity as Payment;
    pub use super::user::Entity as User;
}

#[cfg(test)]
mod test {
    use chrono::{NaiveDate, Utc};
    use migration::{Migrator, MigratorTrait};
    use rust_decimal::Decimal;
    use sea_orm::{
        ActiveModelTrait, ColumnTrait, ConnectionTrait, Database, DatabaseConnection, DbErr,
        EntityTrait, QueryFilter, Set,
    };

    use super::*;
    use admission::{AdmissionStatus, BloodGroup, Gender};
    use prelude::*;
    use user::UserRole;

    async fn setup_db() -> Result<DatabaseConnection, DbErr> {
        // Connect to the SQLite database
        let db = Database::connect("sqlite::memory:").await?;

        // Enable foreign keys
        db.execute_unprepared("PRAGMA foreign_keys = ON;").await?;

        // Try to apply migrations first
        Migrator::up(&db, None).await.expect("Migrations failed.");
        Ok(db)
    }

    #[tokio::test]
    async fn test_entity_integration() -> Result<(), DbErr> {
        // Setup database
        let db = setup_db().await?;

        // Create branches
        let branch1 = branch::ActiveModel {
            name: Set("Dhanmondi".to_string()),
            address: Set("House 12, Road 7, Dhanmondi".to_string()),
            phone: Set("01700000001".to_string()),
            image_url: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let branch2 = branch::ActiveModel {
            name: Set("Uttara".to_string()),
            address: Set("Sector 4, Uttara".to_string()),
            phone: Set("01700000002".to_string()),
            image_url: Set(None),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Create users
        let user1 = user::ActiveModel {
            username: Set("d101".to_string()),
            password_hash: Set("$2b$04$placeholderhash".to_string()),
            name: Set("Karim Rahman".to_string()),
            email: Set("karim@example.com".to_string()),
            phone: Set("01800000001".to_string()),
            father_name: Set("Abdul Rahman".to_string()),
            mother_name: Set("Salma Rahman".to_string()),
            image_url: Set(None),
            gender: Set(Gender::Male),
            role: Set(UserRole::Student),
            is_admin: Set(false),
            branch_id: Set(Some(branch1.id)),
            joined_on: Set(NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let user2 = user::ActiveModel {
            username: Set("shanto".to_string()),
            password_hash: Set("$2b$04$placeholderhash".to_string()),
            name: Set("Shanto Islam".to_string()),
            email: Set("shanto@example.com".to_string()),
            phone: Set("01800000002".to_string()),
            father_name: Set("Rafiq Islam".to_string()),
            mother_name: Set("Nasima Islam".to_string()),
            image_url: Set(None),
            gender: Set(Gender::Male),
            role: Set(UserRole::Trainer),
            is_admin: Set(true),
            branch_id: Set(Some(branch2.id)),
            joined_on: Set(NaiveDate::from_ymd_opt(2020, 6, 1).unwrap()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Create a pending admission
        let admission = admission::ActiveModel {
            name: Set("Jane Doe".to_string()),
            father_name: Set("John Doe".to_string()),
            mother_name: Set("Mary Doe".to_string()),
            date_of_birth: Set(NaiveDate::from_ymd_opt(2008, 3, 21).unwrap()),
            gender: Set(Gender::Female),
            blood_group: Set(Some(BloodGroup::OPositive)),
            email: Set("jane@example.com".to_string()),
            phone: Set("01900000001".to_string()),
            image_url: Set(None),
            transaction_ref: Set(Some("TXN-123".to_string())),
            status: Set(AdmissionStatus::Pending),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Record a payment for user1
        let payment = payment::ActiveModel {
            user_id: Set(user1.id),
            amount: Set(Decimal::new(150000, 2)), // 1500.00
            paid_on: Set(NaiveDate::from_ymd_opt(2024, 2, 1).unwrap()),
            transaction_ref: Set(None),
            note: Set(Some("February fee".to_string())),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Publish a notice
        let notice = notice::ActiveModel {
            title: Set("Winter camp".to_string()),
            body: Set("Registration opens next week.".to_string()),
            published_on: Set(NaiveDate::from_ymd_opt(2024, 11, 1).unwrap()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Gallery and achievements
        let gallery_item = gallery_item::ActiveModel {
            caption: Set(Some("Belt ceremony 2024".to_string())),
            image_url: Set("/uploads/gallery/belt-2024.jpg".to_string()),
            created_at: Set(Utc::now()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        let achievement = achievement::ActiveModel {
            title: Set("National championship gold".to_string()),
            description: Set(Some("Under-18 kumite".to_string())),
            image_url: Set(None),
            achieved_on: Set(NaiveDate::from_ymd_opt(2024, 8, 10).unwrap()),
            ..Default::default()
        }
        .insert(&db)
        .await?;

        // Read back and verify data

        let users = User::find().all(&db).await?;
        assert_eq!(users.len(), 2);
        assert!(users.iter().any(|u| u.username == "d101"));
        assert!(users.iter().any(|u| u.username == "shanto"));

        let branches = Branch::find().all(&db).await?;
        assert_eq!(branches.len(), 2);

        let admissions = Admission::find()
            .filter(admission::Column::Status.eq(AdmissionStatus::Pending))
            .all(&db)
            .await?;
        assert_eq!(admissions.len(), 1);
        assert_eq!(admissions[0].id, admission.id);
        assert_eq!(admissions[0].blood_group, Some(BloodGroup::OPositive));

        let payments = Payment::find()
            .filter(payment::Column::UserId.eq(user1.id))
            .all(&db)
            .await?;
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].id, payment.id);
        assert_eq!(payments[0].amount, Decimal::new(150000, 2));

        let notices = Notice::find().all(&db).await?;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].id, notice.id);

        let gallery = GalleryItem::find().all(&db).await?;
        assert_eq!(gallery.len(), 1);
        assert_eq!(gallery[0].id, gallery_item.id);

        let achievements = Achievement::find().all(&db).await?;
        assert_eq!(achievements.len(), 1);
        assert_eq!(achievements[0].id, achievement.id);

        // Branch relation: users assigned to branch1
        let branch1_members = User::find()
            .filter(user::Column::BranchId.eq(branch1.id))
            .all(&db)
            .await?;
        assert_eq!(branch1_members.len(), 1);
        assert_eq!(branch1_members[0].id, user1.id);
        assert_ne!(branch1_members[0].id, user2.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_username_unique_constraint() -> Result<(), DbErr> {
        let db = setup_db().await?;

        let make_user = |username: &str| user::ActiveModel {
            username: Set(username.to_string()),
            password_hash: Set("$2b$04$placeholderhash".to_string()),
            name: Set("Member".to_string()),
            email: Set("member@example.com".to_string()),
            phone: Set("01800000000".to_string()),
            father_name: Set("Father".to_string()),
            mother_name: Set("Mother".to_string()),
            image_url: Set(None),
            gender: Set(Gender::Male),
            role: Set(UserRole::Student),
            is_admin: Set(false),
            branch_id: Set(None),
            joined_on: Set(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            ..Default::default()
        };

        make_user("d101").insert(&db).await?;

        // A second insert with the same username must violate the
        // unique constraint the allocator relies on.
        let result = make_user("d101").insert(&db).await;
        assert!(result.is_err());
        assert!(matches!(
            result.unwrap_err().sql_err(),
            Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
        ));

        Ok(())
    }
}
