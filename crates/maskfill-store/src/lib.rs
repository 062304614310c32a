//! maskfill-store: sentence and response store adapters.
//!
//! Implements the `SurveyStore` trait for a hosted Supabase project and for
//! local TOML fixtures, and builds the configured store from `maskfill.toml`.

pub mod config;
pub mod fixture;
pub mod supabase;

pub use config::{create_store, load_config_from, MaskfillConfig, StoreConfig};
pub use fixture::FixtureStore;
pub use supabase::SupabaseStore;
