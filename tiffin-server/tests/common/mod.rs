//! Shared test harness: tempfile-backed state, collaborator doubles and
//! catalog seeding.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use sqlx::SqlitePool;
use tempfile::TempDir;

use tiffin_server::collab::notify::{NotificationDispatcher, NotifyError, OrderNotification};
use tiffin_server::collab::payment::{PaymentError, PaymentGateway, RefundRequest, RefundResult};
use tiffin_server::core::{Config, ServerState};
use tiffin_server::db::DbService;

/// Records refund requests; optionally fails every call.
pub struct RecordingGateway {
    pub calls: Mutex<Vec<RefundRequest>>,
    pub fail: bool,
}

impl RecordingGateway {
    pub fn succeeding() -> Arc<Self> {
        Arc::new(Self { calls: Mutex::new(Vec::new()), fail: false })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self { calls: Mutex::new(Vec::new()), fail: true })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for RecordingGateway {
    async fn refund(&self, request: RefundRequest) -> Result<RefundResult, PaymentError> {
        let order_id = request.order_id;
        self.calls.lock().unwrap().push(request);
        if self.fail {
            Err(PaymentError::Rejected("card network declined the refund".into()))
        } else {
            Ok(RefundResult { refund_id: format!("re_{order_id}"), status: "succeeded".into() })
        }
    }
}

/// Swallows notifications; dispatch runs detached so tests assert on
/// persisted state instead of these.
pub struct SilentNotifier;

#[async_trait]
impl NotificationDispatcher for SilentNotifier {
    async fn notify_new_order(&self, _notice: OrderNotification) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn notify_order_status(&self, _notice: OrderNotification) -> Result<(), NotifyError> {
        Ok(())
    }

    async fn notify_order_cancelled(&self, _notice: OrderNotification) -> Result<(), NotifyError> {
        Ok(())
    }
}

pub struct TestEnv {
    pub state: ServerState,
    pub payments: Arc<RecordingGateway>,
    // Dropping the TempDir deletes the database file
    _work_dir: TempDir,
}

pub async fn setup() -> TestEnv {
    setup_with_gateway(RecordingGateway::succeeding()).await
}

pub async fn setup_with_gateway(payments: Arc<RecordingGateway>) -> TestEnv {
    let work_dir = TempDir::new().expect("temp dir");
    let db_path = work_dir.path().join("tiffin-test.db");
    let db = DbService::new(&db_path.to_string_lossy())
        .await
        .expect("database setup");

    let config = Config::with_overrides(work_dir.path().to_string_lossy().to_string(), 0);
    let state = ServerState::new(config, db.pool, payments.clone(), Arc::new(SilentNotifier));

    seed_catalog(&state.db).await;

    TestEnv { state, payments, _work_dir: work_dir }
}

pub const RESTAURANT_PIZZA: i64 = 100;
pub const RESTAURANT_SUSHI: i64 = 200;

pub const ITEM_MARGHERITA: i64 = 1;
pub const ITEM_SUSHI_SET: i64 = 2;

pub const VARIATION_SIZE: i64 = 11;
pub const OPTION_SIZE_LARGE: i64 = 111;
pub const ADD_ON_EXTRAS: i64 = 21;
pub const OPTION_EXTRA_CHEESE: i64 = 211;

/// Two restaurants: a pizza place with a sized, topped item (10.00 base,
/// +2.00 large, +0.50 cheese) and a sushi place with a plain item.
async fn seed_catalog(pool: &SqlitePool) {
    sqlx::query(
        "INSERT INTO menu_item (id, restaurant_id, category_id, name, base_price, is_active, created_at, updated_at) VALUES \
         (?1, ?2, 1, 'Margherita', 10.0, 1, 0, 0), (?3, ?4, 2, 'Sushi Set', 8.0, 1, 0, 0)",
    )
    .bind(ITEM_MARGHERITA)
    .bind(RESTAURANT_PIZZA)
    .bind(ITEM_SUSHI_SET)
    .bind(RESTAURANT_SUSHI)
    .execute(pool)
    .await
    .expect("seed menu items");

    sqlx::query(
        "INSERT INTO product_variation (id, menu_item_id, name, selection_mode) VALUES (?1, ?2, 'Size', 'SINGLE')",
    )
    .bind(VARIATION_SIZE)
    .bind(ITEM_MARGHERITA)
    .execute(pool)
    .await
    .expect("seed variation");

    sqlx::query(
        "INSERT INTO variation_option (id, variation_id, name, price_modifier, is_active) VALUES (?1, ?2, 'Large', 2.0, 1)",
    )
    .bind(OPTION_SIZE_LARGE)
    .bind(VARIATION_SIZE)
    .execute(pool)
    .await
    .expect("seed variation option");

    sqlx::query(
        "INSERT INTO add_on_group (id, menu_item_id, name, is_required, max_selections) VALUES (?1, ?2, 'Extras', 0, 3)",
    )
    .bind(ADD_ON_EXTRAS)
    .bind(ITEM_MARGHERITA)
    .execute(pool)
    .await
    .expect("seed add-on group");

    sqlx::query(
        "INSERT INTO add_on_option (id, add_on_id, name, price, is_active) VALUES (?1, ?2, 'Extra Cheese', 0.5, 1)",
    )
    .bind(OPTION_EXTRA_CHEESE)
    .bind(ADD_ON_EXTRAS)
    .execute(pool)
    .await
    .expect("seed add-on option");
}

pub async fn seed_address(pool: &SqlitePool, id: i64, customer_id: i64) {
    sqlx::query(
        "INSERT INTO delivery_address (id, customer_id, label, line1, line2, city, postal_code, phone, created_at, updated_at) \
         VALUES (?1, ?2, 'Home', '1 High Street', NULL, 'Springfield', '12345', NULL, 0, 0)",
    )
    .bind(id)
    .bind(customer_id)
    .execute(pool)
    .await
    .expect("seed address");
}

pub async fn seed_promo(
    pool: &SqlitePool,
    id: i64,
    code: &str,
    percentage: f64,
    starts_at: i64,
    ends_at: i64,
    restaurant_id: Option<i64>,
) {
    sqlx::query(
        "INSERT INTO promo_code (id, code, discount_percentage, starts_at, ends_at, restaurant_id, is_active, created_at) \
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, 1, 0)",
    )
    .bind(id)
    .bind(code)
    .bind(percentage)
    .bind(starts_at)
    .bind(ends_at)
    .bind(restaurant_id)
    .execute(pool)
    .await
    .expect("seed promo code");
}

/// The standard configured line: large Margherita with extra cheese
/// (unit price 12.50 once resolved).
pub fn margherita_selection() -> shared::SelectionSet {
    shared::SelectionSet {
        variations: vec![shared::selection::VariationChoice {
            variation_id: VARIATION_SIZE,
            option_id: OPTION_SIZE_LARGE,
        }],
        add_ons: vec![shared::selection::AddOnChoice {
            add_on_id: ADD_ON_EXTRAS,
            option_ids: vec![OPTION_EXTRA_CHEESE],
        }],
    }
}

/// Put `quantity` large-with-cheese Margheritas in the customer's cart.
pub async fn fill_cart(state: &ServerState, customer_id: i64, quantity: i64) {
    let cart = tiffin_server::db::repository::cart::get_or_create(&state.db, customer_id)
        .await
        .expect("cart");
    tiffin_server::cart::merge_line(
        &state.db,
        cart.id,
        ITEM_MARGHERITA,
        RESTAURANT_PIZZA,
        quantity,
        None,
        &margherita_selection(),
    )
    .await
    .expect("fill cart");
}
