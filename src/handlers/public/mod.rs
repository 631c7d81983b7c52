// Public tier: token acquisition and signup. No identity required; the two
// auth pages redirect already-authenticated callers away via the route gate.

pub mod auth;
