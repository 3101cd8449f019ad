pub mod attendance;
pub mod auth;
pub mod chat;
pub mod classes;
pub mod complaints;
pub mod dashboard;
pub mod department_admin;
pub mod departments;
pub mod grades;
pub mod health;
pub mod notices;
pub mod subjects;
pub mod timetable;
pub mod users;
pub mod ws;

use crate::state::SharedState;
use axum::Router;

/// Every `/api/*` resource
pub fn router() -> Router<SharedState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/departments", departments::router())
        .nest("/department-admin", department_admin::router())
        .nest("/classes", classes::router())
        .nest("/subjects", subjects::router())
        .nest("/timetable", timetable::router())
        .nest("/attendance", attendance::router())
        .nest("/grades", grades::router())
        .nest("/notices", notices::router())
        .nest("/complaints", complaints::router())
        .nest("/chat", chat::router())
        .nest("/dashboard", dashboard::router())
        .nest("/ws", ws::router())
}
