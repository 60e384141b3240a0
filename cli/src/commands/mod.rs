mod helpers;
mod meal;
mod plan;
mod profile;
mod reset;
mod summary;

pub(crate) use meal::{cmd_delete, cmd_list, cmd_log, cmd_update};
pub(crate) use plan::cmd_plan;
pub(crate) use profile::{cmd_profile_set, cmd_profile_show};
pub(crate) use reset::cmd_reset;
pub(crate) use summary::{cmd_history, cmd_summary};
