// handlers/mod.rs - 3-tier handler architecture
//
// Public (no identity required) -> Dashboard (effective tenant identity)
// -> Console (real, non-impersonating super admin). The route gate
// middleware enforces the tiers; handlers only consume the injected
// identity and effective-session extensions.

pub mod console;
pub mod dashboard;
pub mod public;
