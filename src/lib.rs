pub mod bootstrap;
pub mod cli;
pub mod commands;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod query;
pub mod remote;
pub mod types;

pub use bootstrap::{Bootstrap, ListPreset, PageDataset};
pub use config::Config;
pub use controller::{
    CaseListController, ControllerAction, ControllerConfig, ControllerState, DestructionListForm,
    EventOutcome, LoadStatus, SelectionState, ZaaktypeSelector, reduce_controller_state,
};
pub use error::{ArchiefError, Result};
pub use query::{BaseQuery, FilterState, FilterUpdate, build_query_url};
pub use remote::{FetchError, HttpZakenClient, ZakenSource};
pub use types::{Zaak, Zaaktype, ZaaktypeChoice, ZaaktypeGroup};
