use chrono::NaiveDate;
use database::{
    ServiceError,
    db::create_connection,
    entities::{classes, users},
    services::{
        attendance::{AttendanceService, NewAttendance, StudentMark},
        chat::ChatService,
        class::{ClassService, NewClass},
        complaint::{ComplaintService, NewComplaint, StatusChange},
        department::{DepartmentService, NewDepartment},
        grade::{GradeInput, GradeService},
        notice::{NewNotice, NoticeService},
        subject::{NewSubject, SubjectService},
        timetable::{GenerateOptions, PeriodEdit, TimetableService},
        user::{NewUser, UserService},
    },
};
use migration::{Migrator, MigratorTrait};
use models::{
    attendance::AttendanceStatus,
    complaint::ComplaintStatus,
    grading::MarkSheet,
    priority::Priority,
    role::Role,
    timetable::{PeriodType, SlotTemplate, Weekday},
};
use rand::{SeedableRng, rngs::StdRng};
use sea_orm::{DatabaseConnection, EntityTrait};
use tempfile::TempDir;
use uuid::Uuid;

async fn setup() -> (TempDir, DatabaseConnection) {
    let dir = tempfile::tempdir().unwrap();
    let url = format!("sqlite://{}?mode=rwc", dir.path().join("campus.db").display());
    let db = create_connection(&url).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    (dir, db)
}

async fn department(db: &DatabaseConnection, code: &str) -> Uuid {
    DepartmentService::create(
        db,
        NewDepartment {
            name: format!("Department {code}"),
            code: code.into(),
            description: None,
        },
    )
    .await
    .unwrap()
    .id
}

async fn user(db: &DatabaseConnection, name: &str, role: Role, department_id: Uuid) -> users::Model {
    UserService::create(
        db,
        NewUser {
            name: name.into(),
            email: format!("{}@campus.test", name.to_lowercase().replace(' ', ".")),
            password_hash: "hash".into(),
            role,
            department_id: Some(department_id),
            semester: None,
            roll_number: None,
            phone: None,
        },
    )
    .await
    .unwrap()
}

async fn class(db: &DatabaseConnection, department_id: Uuid, section: &str, capacity: i32) -> classes::Model {
    ClassService::create(
        db,
        NewClass {
            name: format!("CSE 3{section}"),
            section: section.into(),
            department_id,
            semester: 3,
            academic_year: "2024-2025".into(),
            capacity,
            class_teacher_id: None,
        },
    )
    .await
    .unwrap()
}

async fn subject(db: &DatabaseConnection, department_id: Uuid, code: &str, credits: i32) -> Uuid {
    SubjectService::create(
        db,
        NewSubject {
            name: format!("Subject {code}"),
            code: code.into(),
            credits,
            semester: 3,
            department_id,
            description: None,
            faculty_ids: vec![],
        },
    )
    .await
    .unwrap()
    .id
}

async fn strength(db: &DatabaseConnection, class_id: Uuid) -> i32 {
    classes::Entity::find_by_id(class_id)
        .one(db)
        .await
        .unwrap()
        .unwrap()
        .current_strength
}

#[tokio::test]
async fn test_duplicate_email_conflicts() {
    let (_dir, db) = setup().await;
    let dept = department(&db, "CSE").await;
    user(&db, "Asha Rao", Role::Student, dept).await;

    let err = UserService::create(
        &db,
        NewUser {
            name: "Someone Else".into(),
            email: "ASHA.RAO@campus.test".into(),
            password_hash: "hash".into(),
            role: Role::Student,
            department_id: Some(dept),
            semester: None,
            roll_number: None,
            phone: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));
}

#[tokio::test]
async fn test_roster_keeps_strength_in_sync() {
    let (_dir, db) = setup().await;
    let dept = department(&db, "CSE").await;
    let a = class(&db, dept, "A", 2).await;
    let b = class(&db, dept, "B", 2).await;
    let s1 = user(&db, "Student One", Role::Student, dept).await;
    let s2 = user(&db, "Student Two", Role::Student, dept).await;
    let s3 = user(&db, "Student Three", Role::Student, dept).await;

    let updated = ClassService::add_students(&db, a.id, vec![s1.id, s2.id]).await.unwrap();
    assert_eq!(updated.current_strength, 2);

    // Over capacity is rejected and nothing changes
    let err = ClassService::add_students(&db, a.id, vec![s3.id]).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert_eq!(strength(&db, a.id).await, 2);

    // Moving a student updates both classes
    ClassService::add_students(&db, b.id, vec![s1.id]).await.unwrap();
    assert_eq!(strength(&db, a.id).await, 1);
    assert_eq!(strength(&db, b.id).await, 1);

    ClassService::remove_student(&db, b.id, s1.id).await.unwrap();
    assert_eq!(strength(&db, b.id).await, 0);

    UserService::delete(&db, s2.id).await.unwrap();
    assert_eq!(strength(&db, a.id).await, 0);
}

#[tokio::test]
async fn test_students_from_other_departments_are_rejected() {
    let (_dir, db) = setup().await;
    let cse = department(&db, "CSE").await;
    let ece = department(&db, "ECE").await;
    let a = class(&db, cse, "A", 10).await;
    let outsider = user(&db, "Other Student", Role::Student, ece).await;
    let teacher = user(&db, "Some Faculty", Role::Faculty, cse).await;

    assert!(ClassService::add_students(&db, a.id, vec![outsider.id]).await.is_err());
    assert!(ClassService::add_students(&db, a.id, vec![teacher.id]).await.is_err());
    assert_eq!(strength(&db, a.id).await, 0);
}

#[tokio::test]
async fn test_class_teacher_flag_follows_assignment() {
    let (_dir, db) = setup().await;
    let dept = department(&db, "CSE").await;
    let a = class(&db, dept, "A", 10).await;
    let first = user(&db, "First Faculty", Role::Faculty, dept).await;
    let second = user(&db, "Second Faculty", Role::Faculty, dept).await;

    ClassService::set_class_teacher(&db, a.id, Some(first.id)).await.unwrap();
    assert!(UserService::get(&db, first.id).await.unwrap().is_class_teacher);

    ClassService::set_class_teacher(&db, a.id, Some(second.id)).await.unwrap();
    assert!(!UserService::get(&db, first.id).await.unwrap().is_class_teacher);
    assert!(UserService::get(&db, second.id).await.unwrap().is_class_teacher);

    ClassService::delete(&db, a.id).await.unwrap();
    assert!(!UserService::get(&db, second.id).await.unwrap().is_class_teacher);
}

#[tokio::test]
async fn test_class_delete_releases_students_and_teacher() {
    let (_dir, db) = setup().await;
    let dept = department(&db, "CSE").await;
    let a = class(&db, dept, "A", 10).await;
    let b = class(&db, dept, "B", 10).await;
    let teacher = user(&db, "Class Faculty", Role::Faculty, dept).await;
    let s1 = user(&db, "Student One", Role::Student, dept).await;
    let s2 = user(&db, "Student Two", Role::Student, dept).await;
    ClassService::add_students(&db, a.id, vec![s1.id, s2.id]).await.unwrap();
    ClassService::set_class_teacher(&db, a.id, Some(teacher.id)).await.unwrap();
    ClassService::set_class_teacher(&db, b.id, Some(teacher.id)).await.unwrap();

    ClassService::delete(&db, a.id).await.unwrap();
    for student in [s1.id, s2.id] {
        assert_eq!(UserService::get(&db, student).await.unwrap().class_id, None);
    }
    // Still in charge of section B
    assert!(UserService::get(&db, teacher.id).await.unwrap().is_class_teacher);

    ClassService::delete(&db, b.id).await.unwrap();
    assert!(!UserService::get(&db, teacher.id).await.unwrap().is_class_teacher);
}

#[tokio::test]
async fn test_enrolment_on_create_is_atomic() {
    let (_dir, db) = setup().await;
    let dept = department(&db, "CSE").await;
    let a = class(&db, dept, "A", 1).await;
    let new_student = |name: &str, roll: &str| NewUser {
        name: name.into(),
        email: format!("{roll}@campus.test"),
        password_hash: "hash".into(),
        role: Role::Student,
        department_id: Some(dept),
        semester: None,
        roll_number: Some(roll.into()),
        phone: None,
    };

    let first = UserService::create_in_class(&db, new_student("Student One", "cse001"), a.id)
        .await
        .unwrap();
    assert_eq!(first.class_id, Some(a.id));
    assert_eq!(first.semester, Some(3));
    assert_eq!(strength(&db, a.id).await, 1);

    // The class is full, so the account is not created either
    let err = UserService::create_in_class(&db, new_student("Student Two", "cse002"), a.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(
        UserService::find_by_email(&db, "cse002@campus.test")
            .await
            .unwrap()
            .is_none()
    );
    assert_eq!(strength(&db, a.id).await, 1);
}

#[tokio::test]
async fn test_subject_assignment_registers_faculty() {
    let (_dir, db) = setup().await;
    let dept = department(&db, "CSE").await;
    let a = class(&db, dept, "A", 10).await;
    let teacher = user(&db, "Dbms Faculty", Role::Faculty, dept).await;
    let dbms = subject(&db, dept, "CS301", 4).await;

    ClassService::assign_subject(&db, a.id, dbms, Some(teacher.id)).await.unwrap();
    let detail = SubjectService::detail(&db, dbms).await.unwrap();
    assert_eq!(detail.faculty.len(), 1);
    assert_eq!(detail.classes.len(), 1);

    SubjectService::remove_faculty(&db, dbms, teacher.id).await.unwrap();
    let subjects = ClassService::subjects(&db, a.id).await.unwrap();
    assert_eq!(subjects[0].assignment.faculty_id, None);
}

#[tokio::test]
async fn test_department_delete_guard() {
    let (_dir, db) = setup().await;
    let dept = department(&db, "CSE").await;
    let a = class(&db, dept, "A", 10).await;

    let err = DepartmentService::delete(&db, dept).await.unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    ClassService::delete(&db, a.id).await.unwrap();
    DepartmentService::delete(&db, dept).await.unwrap();
}

#[tokio::test]
async fn test_timetable_generation_replaces_previous() {
    let (_dir, db) = setup().await;
    let dept = department(&db, "CSE").await;
    let a = class(&db, dept, "A", 10).await;
    let teacher = user(&db, "Os Faculty", Role::Faculty, dept).await;
    let os = subject(&db, dept, "CS302", 3).await;
    let dbms = subject(&db, dept, "CS303", 2).await;
    ClassService::assign_subject(&db, a.id, os, Some(teacher.id)).await.unwrap();
    ClassService::assign_subject(&db, a.id, dbms, None).await.unwrap();

    let options = GenerateOptions {
        days: Some(vec![Weekday::Monday, Weekday::Tuesday]),
        slots: Some(vec![
            SlotTemplate::new("09:00", "10:00", PeriodType::Class),
            SlotTemplate::new("10:00", "10:15", PeriodType::Break),
            SlotTemplate::new("10:15", "11:15", PeriodType::Class),
            SlotTemplate::new("11:15", "12:15", PeriodType::Class),
        ]),
        rooms: Some(vec!["Room 7".into()]),
    };
    let mut rng = StdRng::seed_from_u64(7);
    let first = TimetableService::generate(&db, a.id, options.clone(), None, &mut rng)
        .await
        .unwrap();
    assert_eq!(first.periods.len(), 8);

    let teaching: Vec<_> = first.periods.iter().filter(|p| p.subject_id.is_some()).collect();
    // Three OS periods and two DBMS periods fit into six teaching slots
    assert_eq!(teaching.len(), 5);
    assert!(teaching.iter().all(|p| p.room.as_deref() == Some("Room 7")));

    let faculty = TimetableService::for_faculty(&db, teacher.id).await.unwrap();
    assert_eq!(faculty.len(), 3);

    let second = TimetableService::generate(&db, a.id, options, None, &mut rng)
        .await
        .unwrap();
    assert_ne!(first.timetable.id, second.timetable.id);
    let current = TimetableService::for_class(&db, a.id).await.unwrap();
    assert_eq!(current.timetable.id, second.timetable.id);
}

#[tokio::test]
async fn test_period_edit_keeps_fields_it_does_not_send() {
    let (_dir, db) = setup().await;
    let dept = department(&db, "CSE").await;
    let ece = department(&db, "ECE").await;
    let a = class(&db, dept, "A", 10).await;
    let teacher = user(&db, "Os Faculty", Role::Faculty, dept).await;
    let outsider = user(&db, "Ece Faculty", Role::Faculty, ece).await;
    let os = subject(&db, dept, "CS302", 1).await;
    let elective = subject(&db, dept, "CS399", 1).await;
    ClassService::assign_subject(&db, a.id, os, Some(teacher.id)).await.unwrap();

    let options = GenerateOptions {
        days: Some(vec![Weekday::Monday]),
        slots: Some(vec![SlotTemplate::new("09:00", "10:00", PeriodType::Class)]),
        rooms: Some(vec!["Room 7".into()]),
    };
    let mut rng = StdRng::seed_from_u64(3);
    let generated = TimetableService::generate(&db, a.id, options, None, &mut rng)
        .await
        .unwrap();
    let timetable_id = generated.timetable.id;
    let period = generated.periods[0].clone();
    assert_eq!(period.subject_id, Some(os));

    let moved = TimetableService::update_period(
        &db,
        timetable_id,
        period.id,
        PeriodEdit {
            room: Some(Some("Lab 9".into())),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(moved.room.as_deref(), Some("Lab 9"));
    assert_eq!(moved.subject_id, Some(os));
    assert_eq!(moved.faculty_id, Some(teacher.id));
    assert_eq!(moved.start_time, "09:00");

    let cleared = TimetableService::update_period(
        &db,
        timetable_id,
        period.id,
        PeriodEdit {
            faculty_id: Some(None),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(cleared.faculty_id, None);
    assert_eq!(cleared.subject_id, Some(os));
    assert_eq!(cleared.room.as_deref(), Some("Lab 9"));

    // Only subjects assigned to the class, only faculty of its department
    let err = TimetableService::update_period(
        &db,
        timetable_id,
        period.id,
        PeriodEdit {
            subject_id: Some(Some(elective)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let err = TimetableService::update_period(
        &db,
        timetable_id,
        period.id,
        PeriodEdit {
            faculty_id: Some(Some(outsider.id)),
            ..Default::default()
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let current = TimetableService::for_class(&db, a.id).await.unwrap();
    assert_eq!(current.periods[0].subject_id, Some(os));
    assert_eq!(current.periods[0].faculty_id, None);

    // A break drops the teaching fields
    let lunch = TimetableService::update_period(
        &db,
        timetable_id,
        period.id,
        PeriodEdit {
            period_type: Some(PeriodType::Lunch),
            ..Default::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(lunch.subject_id, None);
    assert_eq!(lunch.room, None);
}

#[tokio::test]
async fn test_attendance_duplicate_and_summary() {
    let (_dir, db) = setup().await;
    let dept = department(&db, "CSE").await;
    let a = class(&db, dept, "A", 10).await;
    let dbms = subject(&db, dept, "CS301", 4).await;
    ClassService::assign_subject(&db, a.id, dbms, None).await.unwrap();
    let s1 = user(&db, "Student One", Role::Student, dept).await;
    let s2 = user(&db, "Student Two", Role::Student, dept).await;
    ClassService::add_students(&db, a.id, vec![s1.id, s2.id]).await.unwrap();

    let session = |day: u32, s1_status| NewAttendance {
        class_id: a.id,
        subject_id: dbms,
        date: NaiveDate::from_ymd_opt(2024, 9, day).unwrap(),
        period: 1,
        records: vec![
            StudentMark {
                student_id: s1.id,
                status: s1_status,
            },
            StudentMark {
                student_id: s2.id,
                status: AttendanceStatus::Present,
            },
        ],
    };

    AttendanceService::mark(&db, session(2, AttendanceStatus::Present), None)
        .await
        .unwrap();
    AttendanceService::mark(&db, session(3, AttendanceStatus::Absent), None)
        .await
        .unwrap();

    let err = AttendanceService::mark(&db, session(2, AttendanceStatus::Absent), None)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Conflict(_)));

    let summary = AttendanceService::student_summary(&db, s1.id).await.unwrap();
    assert_eq!(summary.overall.total, 2);
    assert_eq!(summary.overall.present, 1);
    assert_eq!(summary.overall.percentage, 50.0);
}

#[tokio::test]
async fn test_release_computes_gpa() {
    let (_dir, db) = setup().await;
    let dept = department(&db, "CSE").await;
    let a = class(&db, dept, "A", 10).await;
    let dbms = subject(&db, dept, "CS301", 4).await;
    let os = subject(&db, dept, "CS302", 2).await;
    ClassService::assign_subject(&db, a.id, dbms, None).await.unwrap();
    ClassService::assign_subject(&db, a.id, os, None).await.unwrap();
    let student = user(&db, "Student One", Role::Student, dept).await;
    ClassService::add_students(&db, a.id, vec![student.id]).await.unwrap();

    let grade = |subject_id, marks| GradeInput {
        student_id: student.id,
        subject_id,
        semester: None,
        academic_year: "2024-2025".into(),
        marks,
    };

    // 28 + 65 = 93 -> O (10 points); 20 + 45 = 65 -> B+ (7 points)
    GradeService::bulk_upsert(
        &db,
        vec![
            grade(dbms, MarkSheet::new(Some(27.0), Some(29.0), Some(65.0))),
            grade(os, MarkSheet::new(Some(20.0), None, Some(45.0))),
        ],
        None,
    )
    .await
    .unwrap();

    // Unreleased grades stay hidden
    assert!(
        GradeService::for_student(&db, student.id, None, true)
            .await
            .unwrap()
            .is_empty()
    );

    let outcome = GradeService::release(&db, a.id, 3).await.unwrap();
    assert_eq!(outcome.students, 1);
    assert_eq!(outcome.grades, 2);

    let summary = GradeService::summary(&db, student.id, true).await.unwrap();
    assert_eq!(summary.semesters.len(), 1);
    let record = &summary.semesters[0];
    assert!(record.is_completed);
    assert_eq!(record.total_credits, 6);
    assert_eq!(record.sgpa, 9.0);
    assert_eq!(summary.cgpa, Some(9.0));
}

#[tokio::test]
async fn test_bulk_grades_are_all_or_nothing() {
    let (_dir, db) = setup().await;
    let dept = department(&db, "CSE").await;
    let dbms = subject(&db, dept, "CS301", 4).await;
    let os = subject(&db, dept, "CS302", 3).await;
    let student = user(&db, "Student One", Role::Student, dept).await;

    let grade = |subject_id, marks| GradeInput {
        student_id: student.id,
        subject_id,
        semester: None,
        academic_year: "2024-2025".into(),
        marks,
    };

    let err = GradeService::bulk_upsert(
        &db,
        vec![
            grade(dbms, MarkSheet::new(Some(25.0), Some(26.0), Some(60.0))),
            grade(os, MarkSheet::new(Some(20.0), None, Some(71.0))),
        ],
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
    assert!(
        GradeService::for_student(&db, student.id, None, false)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn test_invalid_marks_are_rejected() {
    let (_dir, db) = setup().await;
    let dept = department(&db, "CSE").await;
    let dbms = subject(&db, dept, "CS301", 4).await;
    let student = user(&db, "Student One", Role::Student, dept).await;

    let err = GradeService::upsert(
        &db,
        GradeInput {
            student_id: student.id,
            subject_id: dbms,
            semester: None,
            academic_year: "2024-2025".into(),
            marks: MarkSheet::new(Some(31.0), None, None),
        },
        None,
    )
    .await
    .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));
}

#[tokio::test]
async fn test_complaint_lifecycle() {
    let (_dir, db) = setup().await;
    let dept = department(&db, "CSE").await;
    let student = user(&db, "Student One", Role::Student, dept).await;
    let admin = user(&db, "Dept Admin", Role::DepartmentAdmin, dept).await;

    let created = ComplaintService::create(
        &db,
        NewComplaint {
            title: "Projector broken".into(),
            description: "Room 101 projector does not turn on".into(),
            category: Some("infrastructure".into()),
            priority: Priority::High,
            attachments: vec![],
        },
        &student,
    )
    .await
    .unwrap();
    assert_eq!(created.complaint.status, ComplaintStatus::Pending);
    assert_eq!(created.history.len(), 1);

    let id = created.complaint.id;
    let change = |status| StatusChange {
        status,
        comment: None,
        resolution: None,
    };

    ComplaintService::update_status(&db, id, change(ComplaintStatus::Resolved), admin.id)
        .await
        .unwrap();
    let err = ComplaintService::update_status(&db, id, change(ComplaintStatus::InProgress), admin.id)
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Validation(_)));

    let reopened =
        ComplaintService::update_status(&db, id, change(ComplaintStatus::Pending), admin.id)
            .await
            .unwrap();
    assert_eq!(reopened.history.len(), 3);
}

#[tokio::test]
async fn test_direct_chat_is_reused_and_tracks_unread() {
    let (_dir, db) = setup().await;
    let dept = department(&db, "CSE").await;
    let alice = user(&db, "Alice Faculty", Role::Faculty, dept).await;
    let bob = user(&db, "Bob Student", Role::Student, dept).await;

    let chat = ChatService::direct(&db, alice.id, bob.id).await.unwrap();
    let again = ChatService::direct(&db, bob.id, alice.id).await.unwrap();
    assert_eq!(chat.chat.id, again.chat.id);

    let sent = ChatService::send(&db, chat.chat.id, alice.id, "Hello".into())
        .await
        .unwrap();
    assert_eq!(sent.recipients.len(), 1);
    assert_eq!(ChatService::total_unread(&db, bob.id).await.unwrap(), 1);

    ChatService::mark_read(&db, chat.chat.id, bob.id).await.unwrap();
    assert_eq!(ChatService::total_unread(&db, bob.id).await.unwrap(), 0);

    ChatService::set_blocked(&db, chat.chat.id, bob.id, true).await.unwrap();
    let err = ChatService::send(&db, chat.chat.id, alice.id, "Still there?".into())
        .await
        .unwrap_err();
    assert!(matches!(err, ServiceError::Forbidden(_)));
}

#[tokio::test]
async fn test_notice_audience_follows_roles_and_class() {
    let (_dir, db) = setup().await;
    let dept = department(&db, "CSE").await;
    let ece = department(&db, "ECE").await;
    let a = class(&db, dept, "A", 10).await;
    let b = class(&db, dept, "B", 10).await;
    let admin = UserService::ensure_admin(&db, "Administrator", "admin@campus.test", "hash".into())
        .await
        .unwrap()
        .unwrap();
    let hod = user(&db, "Department Head", Role::DepartmentAdmin, dept).await;
    let teacher = user(&db, "Some Faculty", Role::Faculty, dept).await;
    let in_a = user(&db, "Student One", Role::Student, dept).await;
    let in_b = user(&db, "Student Two", Role::Student, dept).await;
    let elsewhere = user(&db, "Ece Student", Role::Student, ece).await;
    ClassService::add_students(&db, a.id, vec![in_a.id]).await.unwrap();
    ClassService::add_students(&db, b.id, vec![in_b.id]).await.unwrap();

    let notice = |target_roles, class_id| NewNotice {
        title: "Lab schedule".into(),
        content: "Labs move to block C".into(),
        category: None,
        priority: Priority::Normal,
        target_roles,
        department_id: Some(dept),
        class_id,
        attachments: vec![],
        expires_at: None,
    };

    let for_students = NoticeService::create(&db, notice(vec![Role::Student], None), hod.id)
        .await
        .unwrap();
    let audience = NoticeService::audience(&db, &for_students).await.unwrap();
    assert!(audience.contains(&in_a.id));
    assert!(audience.contains(&in_b.id));
    assert!(audience.contains(&admin.id));
    assert!(!audience.contains(&teacher.id));
    assert!(!audience.contains(&elsewhere.id));

    let for_class = NoticeService::create(&db, notice(vec![], Some(a.id)), hod.id)
        .await
        .unwrap();
    let audience = NoticeService::audience(&db, &for_class).await.unwrap();
    assert!(audience.contains(&in_a.id));
    assert!(audience.contains(&teacher.id));
    assert!(!audience.contains(&in_b.id));
    assert!(!audience.contains(&elsewhere.id));
}
