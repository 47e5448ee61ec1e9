pub mod api;
pub mod config;
pub mod db;
pub mod store;

pub use db::DbPool;

use config::Config;
use store::HabitStore;

pub struct AppState {
    pub config: Config,
    pub db: DbPool,
    pub store: HabitStore,
}

impl AppState {
    pub fn new(config: Config, db: DbPool) -> Self {
        let store = HabitStore::new(db.clone());
        Self { config, db, store }
    }
}
