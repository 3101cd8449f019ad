use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use database::{db::create_connection, services::user::UserService};
use http_body_util::BodyExt;
use migration::{Migrator, MigratorTrait};
use serde_json::{Value, json};
use server::{
    app,
    auth::password::hash_password,
    config::Config,
    realtime::{Delivery, Room},
    state::{AppState, SharedState},
};
use std::collections::HashMap;
use tempfile::TempDir;
use tokio::sync::broadcast;
use tower::ServiceExt;
use uuid::Uuid;

const ADMIN_EMAIL: &str = "admin@campus.test";
const ADMIN_PASSWORD: &str = "Admin@123";
const BOUNDARY: &str = "campus-test-boundary";

struct TestApp {
    _dir: TempDir,
    state: SharedState,
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let vars: HashMap<&str, String> = HashMap::from([
            (
                "DATABASE_URL",
                format!("sqlite://{}?mode=rwc", dir.path().join("api.db").display()),
            ),
            ("JWT_SECRET", "integration-secret".to_string()),
            (
                "UPLOAD_DIR",
                dir.path().join("uploads").display().to_string(),
            ),
        ]);
        let config = Config::from_lookup(|key| vars.get(key).cloned()).unwrap();

        let db = create_connection(&config.database_url).await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        UserService::ensure_admin(
            &db,
            "Administrator",
            ADMIN_EMAIL,
            hash_password(ADMIN_PASSWORD).unwrap(),
        )
        .await
        .unwrap();

        let state = AppState::new(db, config);
        Self {
            router: app(state.clone()),
            state,
            _dir: dir,
        }
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, body)
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    async fn multipart(
        &self,
        uri: &str,
        token: &str,
        fields: &[(&str, &str)],
        file: Option<(&str, &[u8])>,
    ) -> (StatusCode, Value) {
        let mut body = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, content)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{file_name}\"\r\nContent-Type: text/plain\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn login(&self, email: &str, password: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["token"].as_str().unwrap().to_string()
    }

    async fn admin(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await
    }

    async fn create(&self, uri: &str, token: &str, body: Value) -> Value {
        let (status, body) = self.call(Method::POST, uri, Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "POST {uri} failed: {body}");
        body
    }
}

/// Admin, one department with its admin, a faculty member and a student
struct Campus {
    admin: String,
    department_id: String,
    dept_admin: String,
    faculty_id: String,
    faculty: String,
    student_id: String,
    student: String,
}

async fn campus(app: &TestApp) -> Campus {
    let admin = app.admin().await;
    let department = app
        .create(
            "/api/departments",
            &admin,
            json!({ "name": "Computer Science", "code": "CSE" }),
        )
        .await;
    let department_id = department["id"].as_str().unwrap().to_string();

    app.create(
        "/api/department-admin",
        &admin,
        json!({
            "name": "Meera Iyer",
            "email": "hod@campus.test",
            "password": "hod-pass",
            "departmentId": department_id,
        }),
    )
    .await;
    let dept_admin = app.login("hod@campus.test", "hod-pass").await;

    let faculty = app
        .create(
            "/api/users",
            &dept_admin,
            json!({
                "name": "Ravi Kumar",
                "email": "ravi@campus.test",
                "password": "faculty-pass",
                "role": "faculty",
            }),
        )
        .await;
    let student = app
        .create(
            "/api/users",
            &dept_admin,
            json!({
                "name": "Asha Rao",
                "email": "asha@campus.test",
                "password": "student-pass",
                "role": "student",
                "rollNumber": "CSE001",
                "semester": 3,
            }),
        )
        .await;

    Campus {
        faculty: app.login("ravi@campus.test", "faculty-pass").await,
        student: app.login("asha@campus.test", "student-pass").await,
        faculty_id: faculty["id"].as_str().unwrap().to_string(),
        student_id: student["id"].as_str().unwrap().to_string(),
        admin,
        department_id,
        dept_admin,
    }
}

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let (status, body) = app.call(Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!("OK"));
}

#[tokio::test]
async fn test_openapi_document_served() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(Method::GET, "/api-docs/openapi.json", None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/api/auth/login"].is_object());
}

#[tokio::test]
async fn test_login_rejects_wrong_password() {
    let app = TestApp::new().await;
    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/login",
            None,
            Some(json!({ "email": ADMIN_EMAIL, "password": "nope" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid email or password");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new().await;
    let (status, _) = app.call(Method::GET, "/api/auth/me", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(Method::GET, "/api/auth/me", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let token = app.admin().await;
    let (status, body) = app.call(Method::GET, "/api/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], ADMIN_EMAIL);
    assert_eq!(body["role"], "admin");
}

#[tokio::test]
async fn test_change_password_then_login() {
    let app = TestApp::new().await;
    let token = app.admin().await;

    let (status, _) = app
        .call(
            Method::PUT,
            "/api/auth/change-password",
            Some(&token),
            Some(json!({ "currentPassword": "wrong", "newPassword": "fresh-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .call(
            Method::PUT,
            "/api/auth/change-password",
            Some(&token),
            Some(json!({ "currentPassword": ADMIN_PASSWORD, "newPassword": "fresh-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    app.login(ADMIN_EMAIL, "fresh-pass").await;
}

#[tokio::test]
async fn test_role_boundaries() {
    let app = TestApp::new().await;
    let campus = campus(&app).await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/departments",
            Some(&campus.dept_admin),
            Some(json!({ "name": "Physics", "code": "PHY" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(Method::GET, "/api/users", Some(&campus.student), None)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .call(
            Method::GET,
            &format!("/api/users/{}", campus.faculty_id),
            Some(&campus.student),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");

    let (status, body) = app
        .call(Method::GET, "/api/users?role=student", Some(&campus.dept_admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["pagination"]["totalItems"], 1);
    assert_eq!(body["users"][0]["departmentId"], campus.department_id.as_str());
}

#[tokio::test]
async fn test_duplicate_department_code_conflicts() {
    let app = TestApp::new().await;
    let admin = app.admin().await;
    let department = app
        .create(
            "/api/departments",
            &admin,
            json!({ "name": "Mechanical", "code": "MECH" }),
        )
        .await;

    let (status, _) = app
        .call(
            Method::POST,
            "/api/departments",
            Some(&admin),
            Some(json!({ "name": "Mechanical Again", "code": "MECH" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, listed) = app
        .call(Method::GET, "/api/departments", Some(&admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let uri = format!("/api/departments/{}", department["id"].as_str().unwrap());
    let (status, detail) = app.call(Method::GET, &uri, Some(&admin), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(detail["department"]["code"], "MECH");

    let (status, _) = app.call(Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_timetable_generation_flow() {
    let app = TestApp::new().await;
    let campus = campus(&app).await;

    let class = app
        .create(
            "/api/classes",
            &campus.dept_admin,
            json!({
                "name": "CSE 3A",
                "section": "A",
                "semester": 3,
                "academicYear": "2024-2025",
                "capacity": 60,
            }),
        )
        .await;
    let class_id = class["id"].as_str().unwrap();

    let subject = app
        .create(
            "/api/subjects",
            &campus.dept_admin,
            json!({ "name": "Operating Systems", "code": "CS301", "credits": 3, "semester": 3 }),
        )
        .await;
    let subject_id = subject["id"].as_str().unwrap();

    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/classes/{class_id}/subjects"),
            Some(&campus.dept_admin),
            Some(json!({ "subjectId": subject_id, "facultyId": campus.faculty_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, _) = app
        .call(
            Method::POST,
            &format!("/api/timetable/generate/{class_id}"),
            Some(&campus.faculty),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, timetable) = app
        .call(
            Method::POST,
            &format!("/api/timetable/generate/{class_id}"),
            Some(&campus.dept_admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{timetable}");
    assert!(!timetable["week"].as_array().unwrap().is_empty());

    let (status, periods) = app
        .call(
            Method::GET,
            &format!("/api/timetable/faculty/{}", campus.faculty_id),
            Some(&campus.faculty),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let periods = periods.as_array().unwrap();
    assert!(!periods.is_empty());
    assert!(
        periods
            .iter()
            .all(|p| p["class"]["id"] == json!(class_id))
    );
}

#[tokio::test]
async fn test_notice_with_attachment_reaches_students() {
    let app = TestApp::new().await;
    let campus = campus(&app).await;

    let (status, _) = app
        .multipart(
            "/api/notices",
            &campus.student,
            &[("title", "Party"), ("content", "Tonight")],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, notice) = app
        .multipart(
            "/api/notices",
            &campus.dept_admin,
            &[
                ("title", "Exam schedule"),
                ("content", "Mid-terms start Monday"),
                ("priority", "high"),
                ("targetRoles", "student"),
            ],
            Some(("../schedule.txt", b"week 9")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{notice}");
    let attachment = &notice["attachments"][0];
    assert_eq!(attachment["fileName"], "schedule.txt");
    assert!(
        attachment["url"]
            .as_str()
            .unwrap()
            .starts_with("/uploads/notices/")
    );

    let (status, file) = app
        .call(Method::GET, attachment["url"].as_str().unwrap(), None, None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(file, json!("week 9"));

    let (_, visible) = app
        .call(Method::GET, "/api/notices", Some(&campus.student), None)
        .await;
    assert_eq!(visible.as_array().unwrap().len(), 1);

    let (_, hidden) = app
        .call(Method::GET, "/api/notices", Some(&campus.faculty), None)
        .await;
    assert!(hidden.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_complaint_lifecycle() {
    let app = TestApp::new().await;
    let campus = campus(&app).await;

    let (status, created) = app
        .multipart(
            "/api/complaints",
            &campus.student,
            &[
                ("title", "Projector broken"),
                ("description", "Room 101 projector does not power on"),
                ("category", "infrastructure"),
            ],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{created}");
    assert_eq!(created["complaint"]["status"], "pending");
    let id = created["complaint"]["id"].as_str().unwrap();

    let (status, _) = app
        .call(
            Method::PATCH,
            &format!("/api/complaints/{id}/status"),
            Some(&campus.student),
            Some(json!({ "status": "resolved" })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, assigned) = app
        .call(
            Method::PUT,
            &format!("/api/complaints/{id}/assign"),
            Some(&campus.dept_admin),
            Some(json!({ "assigneeId": campus.faculty_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{assigned}");

    let (_, listed) = app
        .call(Method::GET, "/api/complaints", Some(&campus.faculty), None)
        .await;
    assert_eq!(listed.as_array().unwrap().len(), 1);

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/complaints/{id}"),
            Some(&campus.faculty),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app
        .call(
            Method::DELETE,
            &format!("/api/complaints/{id}"),
            Some(&campus.admin),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_direct_chat_unread_and_read() {
    let app = TestApp::new().await;
    let campus = campus(&app).await;

    let (status, chat) = app
        .call(
            Method::POST,
            "/api/chat/direct",
            Some(&campus.student),
            Some(json!({ "userId": campus.faculty_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{chat}");
    let chat_id = chat["id"].as_str().unwrap();

    let (_, again) = app
        .call(
            Method::POST,
            "/api/chat/direct",
            Some(&campus.faculty),
            Some(json!({ "userId": campus.student_id })),
        )
        .await;
    assert_eq!(again["id"], chat["id"]);

    let (status, _) = app
        .call(
            Method::POST,
            &format!("/api/chat/{chat_id}/messages"),
            Some(&campus.student),
            Some(json!({ "content": "Is the lab open today?" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, chats) = app
        .call(Method::GET, "/api/chat", Some(&campus.faculty), None)
        .await;
    assert_eq!(chats[0]["unread"], 1);
    assert_eq!(chats[0]["lastMessage"]["content"], "Is the lab open today?");

    let (status, _) = app
        .call(
            Method::POST,
            &format!("/api/chat/{chat_id}/read"),
            Some(&campus.faculty),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, chats) = app
        .call(Method::GET, "/api/chat", Some(&campus.faculty), None)
        .await;
    assert_eq!(chats[0]["unread"], 0);

    let (status, _) = app
        .call(
            Method::POST,
            "/api/chat/group",
            Some(&campus.student),
            Some(json!({ "name": "Study group", "participantIds": [campus.faculty_id] })),
        )
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_dashboard_matches_role() {
    let app = TestApp::new().await;
    let campus = campus(&app).await;

    let (status, admin) = app
        .call(Method::GET, "/api/dashboard", Some(&campus.admin), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(admin["role"], "admin");
    assert_eq!(admin["admin"]["departments"], 1);
    assert_eq!(admin["admin"]["students"], 1);
    assert!(admin.get("student").is_none());

    let (_, student) = app
        .call(Method::GET, "/api/dashboard", Some(&campus.student), None)
        .await;
    assert_eq!(student["role"], "student");
    assert!(student["student"].is_object());
}

/// Rooms that received an event since `rx` subscribed
fn delivered_rooms(rx: &mut broadcast::Receiver<Delivery>, event: &str) -> Vec<Room> {
    let mut rooms = Vec::new();
    while let Ok(delivery) = rx.try_recv() {
        let frame: Value = serde_json::from_str(&delivery.payload).unwrap();
        if frame["event"] == event {
            rooms.push(delivery.room);
        }
    }
    rooms
}

#[tokio::test]
async fn test_notice_push_reaches_only_its_audience() {
    let app = TestApp::new().await;
    let campus = campus(&app).await;
    let student = Room::User(Uuid::parse_str(&campus.student_id).unwrap());
    let faculty = Room::User(Uuid::parse_str(&campus.faculty_id).unwrap());
    let department = Room::Department(Uuid::parse_str(&campus.department_id).unwrap());

    let mut rx = app.state.hub.subscribe();
    let (status, body) = app
        .multipart(
            "/api/notices",
            &campus.dept_admin,
            &[
                ("title", "Fee deadline"),
                ("content", "Pay semester fees by Friday"),
                ("targetRoles", "student"),
            ],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let rooms = delivered_rooms(&mut rx, "notice:new");
    assert!(rooms.contains(&student));
    assert!(!rooms.contains(&faculty));
    assert!(!rooms.contains(&department));

    let (_, visible) = app
        .call(Method::GET, "/api/notices", Some(&campus.faculty), None)
        .await;
    assert_eq!(visible.as_array().unwrap().len(), 0);

    // A class notice skips students outside the class
    let class = app
        .create(
            "/api/classes",
            &campus.dept_admin,
            json!({
                "name": "CSE 3B",
                "section": "B",
                "semester": 3,
                "academicYear": "2024-2025",
                "capacity": 60,
            }),
        )
        .await;
    let (status, body) = app
        .multipart(
            "/api/notices",
            &campus.dept_admin,
            &[
                ("title", "Section B lab"),
                ("content", "Lab moved to block C"),
                ("classId", class["id"].as_str().unwrap()),
            ],
            None,
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");

    let rooms = delivered_rooms(&mut rx, "notice:new");
    assert!(rooms.contains(&faculty));
    assert!(!rooms.contains(&student));
}

#[tokio::test]
async fn test_students_see_only_released_grades() {
    let app = TestApp::new().await;
    let campus = campus(&app).await;

    let class = app
        .create(
            "/api/classes",
            &campus.dept_admin,
            json!({
                "name": "CSE 3A",
                "section": "A",
                "semester": 3,
                "academicYear": "2024-2025",
                "capacity": 60,
            }),
        )
        .await;
    let class_id = class["id"].as_str().unwrap();
    let (status, body) = app
        .call(
            Method::POST,
            &format!("/api/classes/{class_id}/students"),
            Some(&campus.dept_admin),
            Some(json!({ "studentIds": [campus.student_id] })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let subject = app
        .create(
            "/api/subjects",
            &campus.dept_admin,
            json!({ "name": "Databases", "code": "CS302", "credits": 4, "semester": 3 }),
        )
        .await;
    let subject_id = subject["id"].as_str().unwrap();

    let (status, body) = app
        .call(
            Method::POST,
            "/api/grades",
            Some(&campus.dept_admin),
            Some(json!({
                "studentId": campus.student_id,
                "subjectId": subject_id,
                "academicYear": "2024-2025",
                "mid1": 28,
                "mid2": 30,
                "external": 65,
            })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let uri = format!("/api/grades/student/{}", campus.student_id);
    let (status, own) = app.call(Method::GET, &uri, Some(&campus.student), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(own.as_array().unwrap().len(), 0);

    let (_, staff) = app.call(Method::GET, &uri, Some(&campus.dept_admin), None).await;
    assert_eq!(staff.as_array().unwrap().len(), 1);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/grades/release",
            Some(&campus.dept_admin),
            Some(json!({ "classId": class_id, "semester": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (_, own) = app.call(Method::GET, &uri, Some(&campus.student), None).await;
    let own = own.as_array().unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0]["grade"]["grade"], "O");
}
