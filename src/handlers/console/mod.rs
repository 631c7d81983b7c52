// Console tier: platform administration. The route gate admits only a
// real, non-impersonating super admin, so handlers here read the `Account`
// extension directly - it is always the genuine actor for audit purposes.

pub mod audit;
pub mod companies;
pub mod credits;
pub mod impersonation;
pub mod users;
