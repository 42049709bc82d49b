use std::env;

use cds_api::config::AppConfig;
use cds_api::db;
use cds_api::db::repository::{course_code_exists, insert_course};
use cds_api::models::NewCourse;
use cds_api::validation::Validator;

fn is_dry_run() -> bool {
    !env::args().any(|a| a == "--apply")
}

fn seed_file() -> String {
    env::args()
        .skip(1)
        .find(|a| !a.starts_with("--"))
        .unwrap_or_else(|| "tools/seed_courses/courses.sample.json".to_string())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::from_env()?;
    let path = seed_file();
    let courses: Vec<NewCourse> = serde_json::from_str(&std::fs::read_to_string(&path)?)?;

    let pool = db::connect(&config.database_url, 1).await?;
    let validator = Validator::new_course();
    let dry_run = is_dry_run();

    let mut inserted = 0;
    let mut skipped = 0;

    for course in courses.iter().cloned() {
        if let Err(failures) = validator.validate(&course) {
            for failure in failures {
                println!(
                    "Skipping {:?}: {} ({})",
                    course.code,
                    failure.message,
                    failure.field.unwrap_or("-")
                );
            }
            skipped += 1;
            continue;
        }

        if course_code_exists(&pool, &course.code).await? {
            println!("Skipping {}: already present", course.code);
            skipped += 1;
            continue;
        }

        if dry_run {
            println!("[DRY RUN] Would insert {} ({})", course.code, course.name);
        } else {
            let created = insert_course(&pool, course).await?;
            println!("Inserted {} -> id {}", created.code, created.id);
        }

        inserted += 1;
    }

    println!(
        "Courses inserted: {} / {} (skipped {}) from {}",
        inserted,
        courses.len(),
        skipped,
        path
    );

    pool.close().await;

    Ok(())
}
