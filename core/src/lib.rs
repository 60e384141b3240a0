pub mod db;
pub mod goal;
pub mod ledger;
pub mod meal_plan;
pub mod models;
pub mod profile;
pub mod progress;
pub mod service;
