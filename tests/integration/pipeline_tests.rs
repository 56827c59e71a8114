/*!
 * End-to-end mirror runs through the application controller.
 *
 * Every test uses an in-process backend, so no network access is needed.
 */

use anyhow::Result;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use crate::common::{self, mock_providers::ConcurrencyGauge, mock_providers::shared};
use doctrans::providers::mock::MockProvider;
use doctrans::providers::Provider;
use doctrans::scheduler::Phase;
use doctrans::{CancellationController, Controller, RunStatus, RunSummary};

async fn mirror(
    source: &Path,
    destination: &Path,
    workers: usize,
    provider: Arc<dyn Provider>,
) -> Result<RunSummary> {
    common::init_test_logging();
    let config = common::test_config(source, destination, workers);
    let controller = Controller::with_provider(config, provider, CancellationController::new());
    controller.run_paths(source, destination).await
}

#[tokio::test]
async fn test_run_withExamplePage_shouldTranslateProseAndCopyAssets() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (source, destination) = (temp_dir.path().join("src"), temp_dir.path().join("dst"));
    common::create_test_file(&source, "index.html", common::EXAMPLE_PAGE.as_bytes())?;
    let css = b"p { color: red }\n";
    common::create_test_file(&source, "style.css", css)?;

    let summary = mirror(&source, &destination, 2, Arc::new(MockProvider::tagged())).await?;

    assert_eq!(summary.status(), RunStatus::Completed);
    assert_eq!(summary.status().exit_code(), 0);
    assert_eq!(summary.copies.succeeded, 1);
    assert_eq!(summary.translations.succeeded, 1);

    assert_eq!(fs::read(destination.join("style.css"))?, css);
    let page = fs::read_to_string(destination.join("index.html"))?;
    assert!(page.contains("[ru] Hello world, see "));
    assert!(page.contains("<code>ls -la</code>"));
    assert!(page.contains("http://example.com/file.tar.gz"));
    Ok(())
}

#[tokio::test]
async fn test_run_withVariousWorkerCounts_shouldMirrorTheWholeTree() -> Result<()> {
    for workers in [1, 3, 8] {
        let temp_dir = common::create_temp_dir()?;
        let (source, destination) = (temp_dir.path().join("src"), temp_dir.path().join("dst"));
        common::create_sample_tree(&source)?;

        let summary = mirror(&source, &destination, workers, Arc::new(MockProvider::tagged())).await?;

        assert_eq!(summary.status(), RunStatus::Completed, "workers = {}", workers);
        assert_eq!(summary.copies.succeeded, 3);
        assert_eq!(summary.translations.succeeded, 3);
        assert_eq!(common::relative_tree(&source), common::relative_tree(&destination));

        let intro = fs::read_to_string(destination.join("chapter01/intro.html"))?;
        assert!(intro.contains("<h1>[ru] Introduction</h1>"));
        assert!(intro.contains("<pre>./configure --prefix=/usr</pre>"));
        assert!(fs::read_to_string(destination.join("chapter01/deep/nested/page.HTM"))?
            .contains("[ru] Deep page"));
        assert_eq!(
            fs::read(destination.join("chapter01/deep/notes.txt"))?,
            b"plain notes"
        );
    }
    Ok(())
}

#[tokio::test]
async fn test_run_withFailingDocument_shouldIsolateTheFailure() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (source, destination) = (temp_dir.path().join("src"), temp_dir.path().join("dst"));
    common::create_sample_tree(&source)?;

    let summary = mirror(&source, &destination, 4, Arc::new(MockProvider::fail_on("Deep page"))).await?;

    assert_eq!(summary.status(), RunStatus::CompletedWithFailures(1));
    assert_eq!(summary.status().exit_code(), 2);
    assert_eq!(summary.translations.succeeded, 2);
    assert_eq!(summary.translations.failed, 1);
    assert_eq!(summary.copies.succeeded, 3);

    let failure = &summary.failures[0];
    assert_eq!(failure.phase, Phase::Translate);
    assert!(failure.path.ends_with("chapter01/deep/nested/page.HTM"));
    assert!(failure.cause.contains("Deep page"));

    assert!(!destination.join("chapter01/deep/nested/page.HTM").exists());
    assert!(destination.join("chapter01/deep/nested").is_dir());
    assert!(destination.join("index.html").is_file());
    Ok(())
}

#[tokio::test]
async fn test_run_withInvalidUtf8Page_shouldFailOnlyThatPage() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (source, destination) = (temp_dir.path().join("src"), temp_dir.path().join("dst"));
    common::create_test_file(&source, "latin1.html", b"<p>caf\xe9</p>")?;
    common::create_test_file(&source, "ok.html", b"<p>Fine</p>")?;

    let summary = mirror(&source, &destination, 2, Arc::new(MockProvider::tagged())).await?;

    assert_eq!(summary.translations.succeeded, 1);
    assert_eq!(summary.translations.failed, 1);
    assert!(summary.failures[0].cause.contains("UTF-8"));
    assert!(!destination.join("latin1.html").exists());
    Ok(())
}

#[tokio::test]
async fn test_run_withExistingDestination_shouldRebuildFromScratch() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (source, destination) = (temp_dir.path().join("src"), temp_dir.path().join("dst"));
    common::create_sample_tree(&source)?;
    common::create_test_file(&destination, "stale/old.html", b"<p>old</p>")?;
    common::create_test_file(&destination, "index.html", b"outdated")?;

    mirror(&source, &destination, 2, Arc::new(MockProvider::tagged())).await?;

    assert!(!destination.join("stale").exists());
    assert!(fs::read_to_string(destination.join("index.html"))?.contains("[ru] Welcome"));
    assert_eq!(common::relative_tree(&source), common::relative_tree(&destination));
    Ok(())
}

#[tokio::test]
async fn test_run_withOldAsset_shouldPreserveModificationTime() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (source, destination) = (temp_dir.path().join("src"), temp_dir.path().join("dst"));
    let asset = common::create_test_file(&source, "images/logo.png", &[1, 2, 3, 4])?;
    let past = SystemTime::now() - Duration::from_secs(30 * 24 * 3600);
    fs::File::options().write(true).open(&asset)?.set_modified(past)?;

    mirror(&source, &destination, 1, Arc::new(MockProvider::identity())).await?;

    let copied = fs::metadata(destination.join("images/logo.png"))?.modified()?;
    let delta = copied.duration_since(past).unwrap_or_else(|e| e.duration());
    assert!(delta < Duration::from_secs(1));
    Ok(())
}

#[tokio::test]
async fn test_run_withUnicodeNames_shouldKeepThemUnchanged() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (source, destination) = (temp_dir.path().join("src"), temp_dir.path().join("dst"));
    common::create_test_file(&source, "глава/страница.html", "<p>Текст</p>".as_bytes())?;
    common::create_test_file(&source, "données/schéma.svg", b"<svg/>")?;

    let summary = mirror(&source, &destination, 2, Arc::new(MockProvider::tagged())).await?;

    assert_eq!(summary.status(), RunStatus::Completed);
    assert!(destination.join("глава/страница.html").is_file());
    assert!(destination.join("données/schéma.svg").is_file());
    Ok(())
}

#[tokio::test]
async fn test_run_withEmptySource_shouldCompleteWithNoWork() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (source, destination) = (temp_dir.path().join("src"), temp_dir.path().join("dst"));
    fs::create_dir_all(&source)?;

    let summary = mirror(&source, &destination, 3, Arc::new(MockProvider::tagged())).await?;

    assert_eq!(summary.status(), RunStatus::Completed);
    assert_eq!(summary.copies.total() + summary.translations.total(), 0);
    assert!(destination.is_dir());
    Ok(())
}

#[tokio::test]
async fn test_run_withMissingSource_shouldFailSetup() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let result = mirror(
        &temp_dir.path().join("nope"),
        &temp_dir.path().join("dst"),
        1,
        Arc::new(MockProvider::tagged()),
    )
    .await;

    assert!(result.is_err());
    assert!(!temp_dir.path().join("dst").exists());
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_run_withTwoWorkers_shouldNeverExceedTwoConcurrentDocuments() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (source, destination) = (temp_dir.path().join("src"), temp_dir.path().join("dst"));
    for index in 0..8 {
        common::create_test_file(
            &source,
            &format!("page{}.html", index),
            format!("<p>Page number {}</p>", index).as_bytes(),
        )?;
    }
    let gauge = shared(ConcurrencyGauge::default());

    let summary = mirror(&source, &destination, 2, gauge.clone()).await?;

    assert_eq!(summary.translations.succeeded, 8);
    assert!(gauge.peak() >= 1);
    assert!(gauge.peak() <= 2, "peak concurrency was {}", gauge.peak());
    Ok(())
}

#[tokio::test]
async fn test_run_summary_shouldSerializeToJson() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let (source, destination) = (temp_dir.path().join("src"), temp_dir.path().join("dst"));
    common::create_sample_tree(&source)?;

    let summary = mirror(&source, &destination, 2, Arc::new(MockProvider::fail_on("Welcome"))).await?;
    let json = serde_json::to_value(&summary)?;

    assert_eq!(json["copies"]["succeeded"], 3);
    assert_eq!(json["translations"]["failed"], 1);
    assert_eq!(json["failures"][0]["phase"], "translate");
    assert_eq!(json["cancelled"], false);
    Ok(())
}

#[tokio::test]
async fn test_run_withSourceInsideDestination_shouldFailBeforeDeleting() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let book = temp_dir.path().join("x/book");
    let source = book.join("en");
    common::create_sample_tree(&source)?;

    let result = mirror(&source, &book, 2, Arc::new(MockProvider::tagged())).await;

    assert!(result.is_err());
    assert!(source.join("index.html").is_file());
    assert!(source.join("stylesheets/book.css").is_file());
    Ok(())
}
