use crate::routes::{
    attendance, auth, chat, classes, complaints, dashboard, department_admin, departments, grades,
    health, notices, subjects, timetable, users, ws,
};
use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "jwt",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// API Documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        health::health,
        auth::login,
        auth::me,
        auth::change_password,
        auth::forgot_password,
        auth::reset_password,
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
        users::update_status,
        departments::create_department,
        departments::list_departments,
        departments::get_department,
        departments::update_department,
        departments::delete_department,
        department_admin::create_department_admin,
        department_admin::list_department_admins,
        department_admin::delete_department_admin,
        department_admin::department_faculty,
        department_admin::department_students,
        department_admin::department_classes,
        classes::create_class,
        classes::list_classes,
        classes::get_class,
        classes::update_class,
        classes::delete_class,
        classes::add_students,
        classes::remove_student,
        classes::set_class_teacher,
        classes::assign_subject,
        classes::unassign_subject,
        subjects::create_subject,
        subjects::list_subjects,
        subjects::get_subject,
        subjects::update_subject,
        subjects::delete_subject,
        subjects::add_faculty,
        subjects::remove_faculty,
        timetable::generate_timetable,
        timetable::class_timetable,
        timetable::faculty_timetable,
        timetable::update_period,
        timetable::delete_timetable,
        attendance::mark_attendance,
        attendance::update_attendance,
        attendance::class_attendance,
        attendance::student_attendance,
        grades::save_grade,
        grades::save_grades,
        grades::release_grades,
        grades::student_grades,
        grades::student_summary,
        grades::class_subject_grades,
        notices::create_notice,
        notices::list_notices,
        notices::get_notice,
        notices::update_notice,
        notices::delete_notice,
        complaints::create_complaint,
        complaints::list_complaints,
        complaints::get_complaint,
        complaints::update_status,
        complaints::assign_complaint,
        complaints::delete_complaint,
        chat::direct_chat,
        chat::group_chat,
        chat::list_chats,
        chat::get_chat,
        chat::list_messages,
        chat::send_message,
        chat::delete_message,
        chat::mark_read,
        chat::set_muted,
        chat::set_blocked,
        chat::add_participants,
        chat::remove_participant,
        dashboard::dashboard,
        ws::connect
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Liveness"),
        (name = "Authentication", description = "Login, password changes and resets"),
        (name = "Users", description = "Accounts of every role"),
        (name = "Departments", description = "Departments and their counts"),
        (name = "Department Admin", description = "Department administrators and their department views"),
        (name = "Classes", description = "Classes, rosters and subject assignments"),
        (name = "Subjects", description = "Subjects and their faculty"),
        (name = "Timetable", description = "Weekly timetable generation and edits"),
        (name = "Attendance", description = "Per-period attendance"),
        (name = "Grades", description = "Marks, release, SGPA and CGPA"),
        (name = "Notices", description = "Notice board"),
        (name = "Complaints", description = "Complaint tracking"),
        (name = "Chat", description = "Direct and group messaging"),
        (name = "Dashboard", description = "Role-specific summaries"),
        (name = "Realtime", description = "WebSocket events"),
    ),
    info(
        title = "Campus API",
        version = "1.0.0",
        description = "Campus administration API",
        license(
            name = "MIT OR Apache-2.0",
        )
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_core_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/health",
            "/api/auth/login",
            "/api/timetable/generate/{class_id}",
            "/api/chat/{id}/messages",
            "/api/ws",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {path}");
        }
    }

    #[test]
    fn test_bearer_scheme_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("jwt"));
    }
}
