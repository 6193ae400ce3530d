//! End-to-end smoke test for the Swachh Rust SDK.
//!
//! Talks to the real vision API. Needs `GEMINI_API_KEY`, and
//! `SWACHH_SMOKE_IMAGE` pointing at a photo of some waste.
//!
//! Run with:
//! ```sh
//! GEMINI_API_KEY=... SWACHH_SMOKE_IMAGE=bottles.jpg cargo test -- --ignored --nocapture
//! ```

use swachh_sdk::{
    EmailIdentity, IdentitySession, ImagePayload, ReportForm, SwachhSdk, VerificationStatus,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Print a section header to stderr.
fn section(name: &str) {
    eprintln!("\n{}", "=".repeat(60));
    eprintln!("  {}", name);
    eprintln!("{}", "=".repeat(60));
}

/// Counters for pass/fail/skip reporting.
struct Counters {
    pass: usize,
    fail: usize,
    skip: usize,
}

impl Counters {
    fn new() -> Self {
        Self {
            pass: 0,
            fail: 0,
            skip: 0,
        }
    }

    fn check(&mut self, label: &str, condition: bool, detail: &str) {
        let status = if condition { "PASS" } else { "FAIL" };
        if condition {
            self.pass += 1;
        } else {
            self.fail += 1;
        }
        if detail.is_empty() {
            eprintln!("  [{}] {}", status, label);
        } else {
            eprintln!("  [{}] {} -- {}", status, label, detail);
        }
    }

    fn skip(&mut self, label: &str, reason: &str) {
        self.skip += 1;
        eprintln!("  [SKIP] {} -- {}", label, reason);
    }
}

// ---------------------------------------------------------------------------
// Main smoke test
// ---------------------------------------------------------------------------

#[test]
#[ignore]
fn smoke_test() {
    let tmp = tempfile::tempdir().unwrap();
    let sdk = SwachhSdk::builder()
        .from_env()
        .data_dir(tmp.path())
        .build()
        .unwrap();
    let mut c = Counters::new();

    // ================================================================
    // 1. IDENTITY
    // ================================================================
    section("Identity");

    let users = sdk.users();
    let mut session = IdentitySession::new(EmailIdentity::new("smoke@example.com", None));
    session.init(&users);
    c.check("login", session.login(&users), session.error().unwrap_or(""));
    let user = session.user().cloned();
    c.check(
        "user ensured",
        user.as_ref().map(|u| u.name == "Anonymous User").unwrap_or(false),
        "",
    );

    // ================================================================
    // 2. VERIFICATION
    // ================================================================
    section("Verification");

    let image_path = std::env::var("SWACHH_SMOKE_IMAGE").ok();
    match (sdk.verifier().is_configured(), image_path) {
        (true, Some(path)) => {
            let mut form = ReportForm::new();
            form.set_image(Some(ImagePayload::from_path(&path).unwrap()));
            form.set_location("Smoke test lane");
            let status = form.verify_with(sdk.verifier()).clone();
            let detail = format!("{:?}", status);
            c.check(
                "verify_with",
                matches!(status, VerificationStatus::Success(_)),
                &detail,
            );

            if status.is_success() {
                let report = sdk.submit_report(&mut form, user.as_ref());
                c.check(
                    "submit_report",
                    report.is_ok(),
                    &format!("{:?}", report.map(|r| (r.waste_type, r.amount))),
                );
            }
        }
        (false, _) => c.skip("verify_with", "GEMINI_API_KEY not set"),
        (_, None) => c.skip("verify_with", "SWACHH_SMOKE_IMAGE not set"),
    }

    // ================================================================
    // 3. DASHBOARD
    // ================================================================
    section("Dashboard");

    let view = sdk.dashboard();
    c.check("dashboard loads", view.error.is_none(), "");
    c.check(
        "six monthly buckets",
        view.charts.waste_collection.len() == 6,
        "",
    );

    let export = tmp.path().join("impact.json.gz");
    c.check(
        "export_dashboard",
        sdk.export_dashboard(&export).is_ok() && export.exists(),
        &export.display().to_string(),
    );

    let display = format!("{}", sdk);
    c.check(
        "Display impl",
        display.contains("SwachhSdk"),
        &format!("display={}", display),
    );

    session.logout();
    sdk.close();
    c.check("close()", true, "SDK closed cleanly");

    // ================================================================
    // SUMMARY
    // ================================================================
    section("SMOKE TEST COMPLETE");

    let total_checks = c.pass + c.fail;
    eprintln!("  Total:   {} checks ({} skipped)", total_checks, c.skip);
    eprintln!("  Passed:  {}", c.pass);
    eprintln!("  Failed:  {}", c.fail);
    eprintln!();

    assert_eq!(c.fail, 0, "{} smoke test checks failed", c.fail);
}
