use time::OffsetDateTime;

use super::dto::FoodItemInput;
use crate::schema::{default_expiry, FieldError, FoodItem, NewFoodItem, ValidationErrors};
use crate::state::AppState;
use crate::store::StoreResult;

/// Creates a food item for `user_id`, estimating the expiry date from its
/// categories when the caller left it out.
pub async fn create_food_item(
    state: &AppState,
    user_id: String,
    input: FoodItemInput,
) -> StoreResult<FoodItem> {
    // Unknown categories surface here as NotFound, before anything is written.
    let categories = state.store.get_categories(&input.category_ids).await?;
    let expiry_date = match input.expiry_date {
        Some(date) => date,
        None => default_expiry(
            OffsetDateTime::now_utc(),
            &categories,
            state.config.default_expiry_days,
        )
        .ok_or_else(|| FieldError::Invalid {
            field: "expiry_date".into(),
            reason: "estimated expiry date is out of range; provide one".into(),
        })
        .map_err(ValidationErrors::from)?,
    };

    state
        .store
        .create_food_item(NewFoodItem {
            user_id,
            name: input.name,
            picture_url: input.picture_url,
            quantity: input.quantity,
            quantity_unit: input.quantity_unit,
            expiry_date,
            input_method: input.input_method,
            category_ids: input.category_ids,
        })
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{InputMethod, NewCategory, NewUser, QuantityUnit};
    use crate::config::AppConfig;
    use crate::store::{MemoryStore, Page, StoreError};
    use std::sync::Arc;
    use time::Duration;

    async fn state_with_user() -> AppState {
        let state = AppState::in_memory();
        state
            .store
            .create_user(NewUser {
                id: "firebase1111".into(),
                name: None,
                email: "john@example.com".into(),
                age: None,
                weight: None,
                profile_picture_url: None,
            })
            .await
            .unwrap();
        state
    }

    fn input(category_ids: Vec<uuid::Uuid>) -> FoodItemInput {
        FoodItemInput {
            name: "Milk".into(),
            picture_url: None,
            quantity: 2,
            quantity_unit: QuantityUnit::Unit,
            expiry_date: None,
            input_method: InputMethod::Manual,
            category_ids,
        }
    }

    #[tokio::test]
    async fn expiry_defaults_to_shortest_category() {
        let state = state_with_user().await;
        let dairy = state
            .store
            .create_category(NewCategory {
                category_name: "Dairy".into(),
                approx_expiry_time: 14,
            })
            .await
            .unwrap();
        let meat = state
            .store
            .create_category(NewCategory {
                category_name: "Meat".into(),
                approx_expiry_time: 3,
            })
            .await
            .unwrap();

        let before = OffsetDateTime::now_utc();
        let item = create_food_item(&state, "firebase1111".into(), input(vec![dairy.id, meat.id]))
            .await
            .unwrap();
        assert!(item.expiry_date >= before + Duration::days(3));
        assert!(item.expiry_date < item.created_at + Duration::days(4));
        assert_eq!(item.categories.len(), 2);
    }

    #[tokio::test]
    async fn expiry_falls_back_to_configured_days() {
        let state = state_with_user().await;
        let before = OffsetDateTime::now_utc();
        let item = create_food_item(&state, "firebase1111".into(), input(vec![]))
            .await
            .unwrap();
        let days = state.config.default_expiry_days;
        assert!(item.expiry_date >= before + Duration::days(days));
    }

    #[tokio::test]
    async fn unrepresentable_expiry_is_a_field_error() {
        let store = MemoryStore::new();
        let config = AppConfig {
            default_expiry_days: i64::MAX / 86_400,
            ..AppConfig::default()
        };
        let state = AppState::from_parts(Arc::new(store), Arc::new(config));
        state
            .store
            .create_user(NewUser {
                id: "firebase1111".into(),
                name: None,
                email: "john@example.com".into(),
                age: None,
                weight: None,
                profile_picture_url: None,
            })
            .await
            .unwrap();

        let err = create_food_item(&state, "firebase1111".into(), input(vec![]))
            .await
            .unwrap_err();
        match err {
            StoreError::Validation(errors) => assert!(errors.has("expiry_date")),
            other => panic!("unexpected {:?}", other),
        }
        let items = state
            .store
            .list_food_items("firebase1111", Page::default())
            .await
            .unwrap();
        assert!(items.is_empty());
    }

    #[tokio::test]
    async fn unknown_category_is_not_found() {
        let state = state_with_user().await;
        let err = create_food_item(&state, "firebase1111".into(), input(vec![uuid::Uuid::new_v4()]))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound { resource: "category", .. }));
    }
}
