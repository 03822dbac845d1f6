use image::{ImageFormat, Rgb, RgbImage};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use simplicity_rs::{BatchScorer, ModifiedLuoSimplicity, SimplicityConfig, SimplicityError};

fn write_test_image(path: &Path, seed: u32) -> anyhow::Result<()> {
    let image = RgbImage::from_fn(24, 24, |x, y| {
        if (8..16).contains(&x) && (8..16).contains(&y) {
            Rgb([230, 30, 30])
        } else {
            Rgb([((x * seed) % 256) as u8, 120, ((y * 7) % 256) as u8])
        }
    });
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    image.save(path)?;
    Ok(())
}

fn quiet_scorer() -> anyhow::Result<BatchScorer> {
    let extractor = ModifiedLuoSimplicity::new(SimplicityConfig::default().with_bins_per_band(8))?;
    Ok(BatchScorer::new(extractor).with_progress(false))
}

#[test]
fn test_directory_scores_are_sorted_and_bounded() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let input_dir = temp_dir.path().join("input");
    write_test_image(&input_dir.join("b.png"), 3)?;
    write_test_image(&input_dir.join("a.png"), 5)?;
    write_test_image(&input_dir.join("nested/c.png"), 11)?;
    fs::write(input_dir.join("notes.txt"), b"not an image")?;

    let scores = quiet_scorer()?.run(&input_dir)?;

    let names: Vec<_> = scores
        .iter()
        .map(|s| s.path.strip_prefix(&input_dir).map(|p| p.to_path_buf()))
        .collect::<Result<_, _>>()?;
    assert_eq!(
        names,
        vec![
            Path::new("a.png").to_path_buf(),
            Path::new("b.png").to_path_buf(),
            Path::new("nested/c.png").to_path_buf(),
        ]
    );
    assert!(scores.iter().all(|s| (0.0..=1.0).contains(&s.score)));
    Ok(())
}

#[test]
fn test_single_file_matches_directory_result() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let file = temp_dir.path().join("only.png");
    write_test_image(&file, 9)?;

    let scorer = quiet_scorer()?;
    let single = scorer.run(&file)?;
    let directory = scorer.run(temp_dir.path())?;

    assert_eq!(single.len(), 1);
    assert_eq!(single, directory);
    Ok(())
}

#[test]
fn test_debug_overlays_mirror_input_tree() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let input_dir = temp_dir.path().join("input");
    let debug_dir = temp_dir.path().join("debug");
    write_test_image(&input_dir.join("top.png"), 2)?;
    write_test_image(&input_dir.join("deep/inner.png"), 4)?;

    let scorer = quiet_scorer()?.with_debug_output(debug_dir.clone(), ImageFormat::Png);
    scorer.run(&input_dir)?;

    for relative in ["top.png", "deep/inner.png"] {
        let overlay = image::open(debug_dir.join(relative))?;
        assert_eq!((overlay.width(), overlay.height()), (24, 24));
    }
    Ok(())
}

#[test]
fn test_empty_directory_yields_no_scores() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    assert!(quiet_scorer()?.run(temp_dir.path())?.is_empty());
    Ok(())
}

#[test]
fn test_undecodable_image_names_the_file() -> anyhow::Result<()> {
    let temp_dir = TempDir::new()?;
    let broken = temp_dir.path().join("broken.png");
    fs::write(&broken, b"definitely not a png")?;

    let err = quiet_scorer()?.run(temp_dir.path()).unwrap_err();
    match err {
        SimplicityError::ImageProcessing { path, operation, .. } => {
            assert!(path.ends_with("broken.png"), "{path}");
            assert_eq!(operation, "decode");
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}
