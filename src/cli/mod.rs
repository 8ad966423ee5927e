mod args;

pub use args::{Cli, CommonArgs, RegisterFreshArgs, SameTenantBurstArgs, ScenarioCmd};
