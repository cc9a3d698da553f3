//! Live store integration tests.
//!
//! All of these need real Firestore credentials (or an emulator via
//! `FIRESTORE_EMULATOR_HOST`) and are ignored by default:
//!
//! ```sh
//! cargo test -p jobgrid-store -- --ignored
//! ```

use chrono::Utc;

use jobgrid_models::{
    Application, JobId, JobPosting, JobState, JobType, Role, SalaryRange, UserId, UserProfile,
};
use jobgrid_store::{
    ApplicationRepository, JobRepository, StoreClient, StoreError, StoredUser, UserRepository,
};

async fn client() -> StoreClient {
    dotenvy::dotenv().ok();
    StoreClient::from_env()
        .await
        .expect("Failed to create store client")
}

fn test_job(owner: &UserId) -> JobPosting {
    JobPosting {
        job_id: JobId::new(),
        title: "Integration Test Engineer".to_string(),
        description: "Testing the store layer".to_string(),
        qualifications: String::new(),
        responsibilities: String::new(),
        job_type: JobType::Remote,
        location: "Anywhere".to_string(),
        salary_range: SalaryRange {
            min: 50_000,
            max: 70_000,
        },
        employer: owner.clone(),
        state: JobState::Active,
        applications_count: 0,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

#[tokio::test]
#[ignore = "requires store credentials"]
async fn test_store_connection() {
    let client = client().await;

    // A missing health document still proves the store is reachable
    let result = client.get_document("_health", "_check").await;
    assert!(result.is_ok());
}

#[tokio::test]
#[ignore = "requires store credentials"]
async fn test_user_round_trip_and_email_index() {
    let client = client().await;
    let repo = UserRepository::new(client.clone());

    let user_id = UserId::new();
    let email = format!("it-{}@example.com", user_id);
    let now = Utc::now();
    let user = StoredUser {
        profile: UserProfile {
            user_id: user_id.clone(),
            name: "Integration Tester".to_string(),
            email: email.clone(),
            role: Role::JobSeeker,
            phone: Some("+1 555 0100".to_string()),
            resume: None,
            skills: vec!["testing".to_string()],
            experience: "plenty".to_string(),
            company_name: None,
            company_description: String::new(),
            website: String::new(),
            created_at: now,
            updated_at: now,
        },
        password_hash: "$argon2id$test".to_string(),
    };

    repo.create(&user).await.expect("create user");

    let by_id = repo.get(&user_id).await.expect("get").expect("exists");
    assert_eq!(by_id.profile.email, email);

    let by_email = repo
        .find_by_email(&email.to_uppercase())
        .await
        .expect("find")
        .expect("index hit");
    assert_eq!(by_email.profile.user_id, user_id);

    // Second account on the same address must collide
    let mut dup = user.clone();
    dup.profile.user_id = UserId::new();
    let err = repo.create(&dup).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(_)));

    // Cleanup
    client
        .delete_document("users", user_id.as_str())
        .await
        .expect("cleanup user");
    client
        .delete_document("user_emails", &email.to_lowercase())
        .await
        .expect("cleanup index");
}

#[tokio::test]
#[ignore = "requires store credentials"]
async fn test_duplicate_application_conflicts() {
    let client = client().await;
    let jobs = JobRepository::new(client.clone());
    let applications = ApplicationRepository::new(client.clone());

    let employer = UserId::new();
    let applicant = UserId::new();
    let job = test_job(&employer);
    jobs.create(&job).await.expect("create job");

    let application = Application::new(job.job_id.clone(), applicant.clone(), None);
    applications.create(&application).await.expect("apply");

    // The deterministic document id makes the second apply collide
    let second = Application::new(job.job_id.clone(), applicant, None);
    let err = applications.create(&second).await.unwrap_err();
    assert!(matches!(err, StoreError::AlreadyExists(_)));

    // Cleanup
    applications
        .delete_for_job(&job.job_id)
        .await
        .expect("cleanup applications");
    jobs.delete(&job.job_id).await.expect("cleanup job");
}

#[tokio::test]
#[ignore = "requires store credentials"]
async fn test_job_queries_and_counter() {
    let client = client().await;
    let jobs = JobRepository::new(client.clone());

    let employer = UserId::new();
    let job = test_job(&employer);
    jobs.create(&job).await.expect("create job");

    let mine = jobs.list_by_employer(&employer).await.expect("query");
    assert!(mine.iter().any(|j| j.job_id == job.job_id));

    let next = jobs
        .increment_applications_count(&job.job_id)
        .await
        .expect("increment");
    assert_eq!(next, 1);

    jobs.delete(&job.job_id).await.expect("cleanup job");
}
