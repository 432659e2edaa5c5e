use std::fmt;

pub const APPOINTMENTS_ROUTE: &str = "/api/appointment";

pub fn appointments_route() -> &'static str {
    APPOINTMENTS_ROUTE
}

/// Item route under [`APPOINTMENTS_ROUTE`]; `id` may be a path parameter such as `:id`.
pub fn appointment_route(id: impl fmt::Display) -> String {
    format!("{APPOINTMENTS_ROUTE}/{id}")
}
