/// Router Module Index
///
/// The HTTP surface is split by who may call it. Access control is declared where
/// the routes are assembled rather than discovered inside handlers.

/// Routes open to anonymous visitors: health, login, navigation and event reads.
pub mod public;

/// Routes that require a session (`AuthUser`), behind the auth middleware.
pub mod authenticated;

/// Event writes restricted to staff roles. Each handler runs the access gate with
/// its own role set.
pub mod staff;

/// Browser navigation: the route table behind the fallback handler.
pub mod pages;
