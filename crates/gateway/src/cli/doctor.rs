use tk_domain::config::{CarrierMode, Config, ConfigSeverity, StoreBackendKind};
use tk_store::open_backend;

/// Run all diagnostic checks and print a summary.
///
/// Returns `Ok(true)` when every check passes, `Ok(false)` when at least
/// one check failed.
pub async fn run(config: &Config, config_path: &str) -> anyhow::Result<bool> {
    println!("takuhai doctor");
    println!("==============\n");

    let mut all_passed = true;

    // 1. Config file
    check_config_file(config_path, &mut all_passed);

    // 2. Config validation
    check_config_validation(config, &mut all_passed);

    // 3. Tracking store
    check_store(config, &mut all_passed);

    // 4. Carrier service
    check_carrier(config, &mut all_passed).await;

    // Summary
    println!();
    if all_passed {
        println!("All checks passed.");
    } else {
        println!("Some checks failed. Review the output above.");
    }

    Ok(all_passed)
}

// ── Individual checks ─────────────────────────────────────────────────

fn check_config_file(config_path: &str, all_passed: &mut bool) {
    let exists = std::path::Path::new(config_path).exists();
    print_check(
        "Config file exists",
        exists,
        if exists {
            config_path.to_owned()
        } else {
            format!("{config_path} not found (using defaults)")
        },
    );
    if !exists {
        *all_passed = false;
    }
}

fn check_config_validation(config: &Config, all_passed: &mut bool) {
    let issues = config.validate();
    let error_count = issues
        .iter()
        .filter(|e| e.severity == ConfigSeverity::Error)
        .count();

    if issues.is_empty() {
        print_check("Config validation", true, "no issues".into());
    } else {
        print_check(
            "Config validation",
            error_count == 0,
            format!(
                "{} issue(s) ({} error(s))",
                issues.len(),
                error_count,
            ),
        );
        for issue in &issues {
            println!("      {issue}");
        }
        if error_count > 0 {
            *all_passed = false;
        }
    }
}

fn check_store(config: &Config, all_passed: &mut bool) {
    let (ok, detail) = match open_backend(&config.store) {
        Ok(_) => match config.store.backend {
            StoreBackendKind::Memory => (true, "memory (records are lost on restart)".into()),
            StoreBackendKind::File => (true, format!("{}", config.store.path.display())),
        },
        Err(e) => (false, format!("{} ({e})", config.store.path.display())),
    };

    print_check("Tracking store opens", ok, detail);

    if !ok {
        *all_passed = false;
    }
}

async fn check_carrier(config: &Config, all_passed: &mut bool) {
    let carrier = &config.carrier;
    let (ok, detail) = match carrier.mode {
        CarrierMode::Static => (
            true,
            format!("static table, {} entr(ies)", carrier.static_results.len()),
        ),
        CarrierMode::Rest => {
            let url = &carrier.base_url;
            let reachable = match reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(5))
                .build()
            {
                Ok(client) => client.get(url).send().await.is_ok(),
                Err(_) => false,
            };
            if reachable {
                (true, url.clone())
            } else {
                (false, format!("{url} (unreachable)"))
            }
        }
    };

    print_check("Carrier service", ok, detail);

    if !ok {
        *all_passed = false;
    }
}

// ── Formatting helper ─────────────────────────────────────────────────

fn print_check(name: &str, passed: bool, detail: String) {
    let status = if passed { "PASS" } else { "FAIL" };
    println!("  [{status}] {name}: {detail}");
}
