// src/bin/seed.rs
// Seeds a running stillmind-api instance with an admin account and
// a starter meditation catalog, driving the public REST API.

use dotenv::dotenv;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::env;
use std::process;

// --- ANSI colors for the terminal ---
const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const RED: &str = "\x1b[31m";
const GREEN: &str = "\x1b[32m";
const YELLOW: &str = "\x1b[33m";
const CYAN: &str = "\x1b[36m";

#[derive(Debug, Clone)]
struct CatalogEntry {
    name: &'static str,
    slug: &'static str,
    description: &'static str,
    category: &'static str,
    difficulty: &'static str,
    default_duration_minutes: i32,
}

const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        name: "Box Breathing",
        slug: "box-breathing",
        description: "Four-count inhale, hold, exhale, hold. A quick reset for the nervous system.",
        category: "breathing",
        difficulty: "beginner",
        default_duration_minutes: 5,
    },
    CatalogEntry {
        name: "Body Scan",
        slug: "body-scan",
        description: "Move attention slowly from toes to head, releasing tension as you go.",
        category: "mindfulness",
        difficulty: "beginner",
        default_duration_minutes: 15,
    },
    CatalogEntry {
        name: "Loving Kindness",
        slug: "loving-kindness",
        description: "Cultivate warmth toward yourself and others with guided phrases.",
        category: "mindfulness",
        difficulty: "intermediate",
        default_duration_minutes: 12,
    },
    CatalogEntry {
        name: "Deep Sleep Wind-Down",
        slug: "deep-sleep",
        description: "A slow, quiet descent designed for the last minutes before sleep.",
        category: "sleep",
        difficulty: "beginner",
        default_duration_minutes: 20,
    },
    CatalogEntry {
        name: "Open Monitoring",
        slug: "open-monitoring",
        description: "Rest in open awareness, noting whatever arises without following it.",
        category: "mindfulness",
        difficulty: "advanced",
        default_duration_minutes: 25,
    },
    CatalogEntry {
        name: "Walking Meditation",
        slug: "walking-meditation",
        description: "Slow, deliberate steps with attention on contact and balance.",
        category: "movement",
        difficulty: "intermediate",
        default_duration_minutes: 10,
    },
    CatalogEntry {
        name: "Breath Counting",
        slug: "breath-counting",
        description: "Count breaths from one to ten and begin again whenever the mind wanders.",
        category: "breathing",
        difficulty: "beginner",
        default_duration_minutes: 10,
    },
];

#[derive(Deserialize)]
struct LoginResponse {
    access_token: String,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    code: String,
    message: String,
}

fn base_url() -> String {
    env::var("STILLMIND_API_URL").unwrap_or_else(|_| "http://127.0.0.1:8004".to_string())
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let base = base_url();
    let username = env::var("ADMIN_USERNAME").unwrap_or_else(|_| "admin".to_string());
    let email = env::var("ADMIN_EMAIL").unwrap_or_else(|_| "admin@stillmind.app".to_string());
    let password = match env::var("ADMIN_PASSWORD") {
        Ok(p) => p,
        Err(_) => {
            eprintln!("{}ADMIN_PASSWORD is required{}", RED, RESET);
            process::exit(1);
        }
    };

    let client = Client::new();

    println!("{}{}== stillmind-api seeder =={}", BOLD, CYAN, RESET);
    println!("Target: {}", base);

    // 1. Register the admin account (the first account becomes admin)
    let resp = client
        .post(format!("{}/api/auth/register", base))
        .json(&json!({ "username": username, "email": email, "password": password }))
        .send()
        .await;

    match resp {
        Ok(r) if r.status().is_success() => {
            println!("{}✓{} registered account '{}'", GREEN, RESET, username);
        }
        Ok(r) if r.status().as_u16() == 409 => {
            println!("{}-{} account '{}' already exists", YELLOW, RESET, username);
        }
        Ok(r) => {
            let status = r.status();
            let detail = r
                .json::<ErrorEnvelope>()
                .await
                .map(|e| format!("{}: {}", e.error.code, e.error.message))
                .unwrap_or_default();
            eprintln!("{}✗ register failed ({}): {}{}", RED, status, detail, RESET);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("{}✗ cannot reach API: {}{}", RED, e, RESET);
            process::exit(1);
        }
    }

    // 2. Log in for a bearer token
    let login: LoginResponse = match client
        .post(format!("{}/api/auth/login", base))
        .json(&json!({ "email": email, "password": password }))
        .send()
        .await
    {
        Ok(r) if r.status().is_success() => r.json().await.unwrap_or_else(|e| {
            eprintln!("{}✗ bad login response: {}{}", RED, e, RESET);
            process::exit(1);
        }),
        Ok(r) => {
            eprintln!("{}✗ login failed ({}){}", RED, r.status(), RESET);
            process::exit(1);
        }
        Err(e) => {
            eprintln!("{}✗ cannot reach API: {}{}", RED, e, RESET);
            process::exit(1);
        }
    };
    println!("{}✓{} logged in", GREEN, RESET);

    // 3. Create the starter catalog
    let mut created = 0u32;
    let mut skipped = 0u32;
    let mut failed = 0u32;

    for entry in CATALOG {
        let resp = client
            .post(format!("{}/api/meditation/types", base))
            .bearer_auth(&login.access_token)
            .json(&json!({
                "name": entry.name,
                "slug": entry.slug,
                "description": entry.description,
                "category": entry.category,
                "difficulty": entry.difficulty,
                "default_duration_minutes": entry.default_duration_minutes,
            }))
            .send()
            .await;

        match resp {
            Ok(r) if r.status().is_success() => {
                println!("  {}✓{} {} ({})", GREEN, RESET, entry.name, entry.category);
                created += 1;
            }
            Ok(r) if r.status().as_u16() == 409 => {
                println!("  {}-{} {} already present", YELLOW, RESET, entry.name);
                skipped += 1;
            }
            Ok(r) => {
                eprintln!("  {}✗{} {} failed ({})", RED, RESET, entry.name, r.status());
                failed += 1;
            }
            Err(e) => {
                eprintln!("  {}✗{} {} failed: {}", RED, RESET, entry.name, e);
                failed += 1;
            }
        }
    }

    println!(
        "{}Done:{} {} created, {} skipped, {} failed",
        BOLD, RESET, created, skipped, failed
    );

    if failed > 0 {
        process::exit(1);
    }
}
