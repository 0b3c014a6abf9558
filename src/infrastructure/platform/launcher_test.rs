use std::time;

use anyhow::Result;

use super::SystemLauncher;
use crate::domain::models::Launcher;
use crate::domain::models::PlatformError;

#[tokio::test]
async fn it_reports_missing_openers() {
    let launcher = SystemLauncher::new("jarvis-missing-opener", vec![]);
    let res = launcher.launch("https://www.youtube.com");

    assert_eq!(res, Err(PlatformError::Unavailable("url launcher")));
}

#[cfg(unix)]
#[tokio::test]
async fn it_passes_the_url_to_the_opener() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let out = dir.path().join("opened.txt");
    let script = format!("printf %s \"$0\" > {}", out.to_string_lossy());

    let launcher = SystemLauncher::new("sh", vec!["-c", &script]);
    launcher.launch("tel:+15551234567")?;

    let mut opened = "".to_string();
    for _ in 0..100 {
        opened = tokio::fs::read_to_string(&out).await.unwrap_or_default();
        if !opened.is_empty() {
            break;
        }
        tokio::time::sleep(time::Duration::from_millis(20)).await;
    }

    assert_eq!(opened, "tel:+15551234567");
    return Ok(());
}

#[cfg(unix)]
#[tokio::test]
async fn it_returns_without_waiting_on_the_opener() -> Result<()> {
    let launcher = SystemLauncher::new("sh", vec!["-c", "sleep 5"]);

    let started = time::Instant::now();
    launcher.launch("https://www.youtube.com")?;

    assert!(started.elapsed() < time::Duration::from_secs(2));
    return Ok(());
}
