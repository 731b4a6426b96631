#[cfg(test)]
mod tests {
    use assert_fs::prelude::*;
    use assert_fs::TempDir;
    use borderly::{
        BatchScheduler, BorderColor, BorderlyError, Compressor, DispositionPolicy, Progress,
        Profile, SizeSpec, SourceFormat, TransformPipeline,
    };
    use image::{ColorType, DynamicImage, GenericImageView, Rgb, RgbImage, Rgba, RgbaImage};
    use std::collections::BTreeSet;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;

    fn write_image(dir: &TempDir, name: &str, width: u32, height: u32) -> PathBuf {
        let child = dir.child(name);
        RgbImage::from_pixel(width, height, Rgb([120, 80, 40]))
            .save(child.path())
            .unwrap();
        child.path().to_path_buf()
    }

    fn profiles() -> Vec<Profile> {
        vec![
            Profile::new("Framed", SizeSpec::parse("4px")).with_border_color(BorderColor::BLACK),
            Profile::new("Small", SizeSpec::default())
                .with_resize(Some(SizeSpec::parse("50%")), None)
                .with_quality(70),
        ]
    }

    fn relative_outputs(outputs: &[PathBuf], root: &Path) -> BTreeSet<PathBuf> {
        outputs
            .iter()
            .map(|path| path.strip_prefix(root).unwrap().to_path_buf())
            .collect()
    }

    #[test]
    fn test_apply_writes_profile_folder() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_image(&temp_dir, "photo.JPG", 300, 200);
        let output = temp_dir.child("out");

        let profile = Profile::new("Gallery", SizeSpec::parse("10%"));
        let pipeline = TransformPipeline::new(output.path());
        let result = pipeline.apply(&input, &profile).unwrap();

        assert_eq!(result, output.path().join("Gallery").join("photo_Gallery.jpg"));
        let written = image::open(&result).unwrap();
        assert_eq!(written.dimensions(), (360, 260));
    }

    #[test]
    fn test_apply_resizes_with_aspect() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_image(&temp_dir, "wide.png", 1600, 1200);
        let output = temp_dir.child("out");

        let profile = Profile::new("Web", SizeSpec::default())
            .with_resize(Some(SizeSpec::parse("800px")), None);
        let result = TransformPipeline::new(output.path())
            .apply(&input, &profile)
            .unwrap();

        assert_eq!(image::open(&result).unwrap().dimensions(), (800, 600));
    }

    #[test]
    fn test_unsupported_and_corrupt_files() {
        let temp_dir = TempDir::new().unwrap();
        let gif = temp_dir.child("anim.gif");
        gif.write_binary(b"GIF89a").unwrap();
        let broken = temp_dir.child("broken.jpg");
        broken.write_str("not a jpeg").unwrap();

        let pipeline = TransformPipeline::new(temp_dir.child("out").path());
        let profile = Profile::default();

        let err = pipeline.apply(gif.path(), &profile).unwrap_err();
        assert!(matches!(err.cause, BorderlyError::UnsupportedFormat(_)));
        assert_eq!(err.profile, "WhiteBorder");

        let err = pipeline.apply(broken.path(), &profile).unwrap_err();
        assert!(matches!(err.cause, BorderlyError::Decode { .. }));

        let err = pipeline
            .apply(&temp_dir.path().join("missing.png"), &profile)
            .unwrap_err();
        assert!(matches!(err.cause, BorderlyError::Decode { .. }));
    }

    #[test]
    fn test_batch_progress_and_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let files: Vec<PathBuf> = (0..3)
            .map(|i| write_image(&temp_dir, &format!("img{}.png", i), 40, 30))
            .collect();
        let output = temp_dir.child("out");

        let reports = Mutex::new(Vec::new());
        let sink = |completed: usize, total: usize| {
            reports.lock().unwrap().push((completed, total));
        };

        let result = BatchScheduler::new(TransformPipeline::new(output.path()))
            .with_workers(4)
            .run(&files, &profiles(), &DispositionPolicy::Keep, &sink)
            .unwrap();

        assert_eq!(result.attempted, 6);
        assert_eq!(result.succeeded, 6);
        assert_eq!(result.outputs.len(), 6);
        assert!(result.is_success());

        let reports = reports.into_inner().unwrap();
        let expected: Vec<(usize, usize)> = (0..=6).map(|n| (n, 6)).collect();
        assert_eq!(reports, expected);

        for file in &files {
            assert!(file.exists());
        }
        assert!(output.child("Framed").child("img0_Framed.png").path().exists());
        assert!(output.child("Small").child("img2_Small.png").path().exists());
    }

    #[test]
    fn test_worker_count_does_not_change_outputs() {
        let temp_dir = TempDir::new().unwrap();
        let files: Vec<PathBuf> = (0..4)
            .map(|i| write_image(&temp_dir, &format!("shot{}.jpg", i), 64, 48))
            .collect();
        let single = temp_dir.child("single");
        let pooled = temp_dir.child("pooled");

        let one = BatchScheduler::new(TransformPipeline::new(single.path()))
            .with_workers(1)
            .run(&files, &profiles(), &DispositionPolicy::Keep, &())
            .unwrap();
        let four = BatchScheduler::new(TransformPipeline::new(pooled.path()))
            .with_workers(4)
            .run(&files, &profiles(), &DispositionPolicy::Keep, &())
            .unwrap();

        assert_eq!(one.succeeded, 8);
        assert_eq!(
            relative_outputs(&one.outputs, single.path()),
            relative_outputs(&four.outputs, pooled.path())
        );
    }

    #[test]
    fn test_progress_channel() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![write_image(&temp_dir, "a.png", 10, 10)];
        let (sender, receiver) = crossbeam_channel::unbounded::<Progress>();

        BatchScheduler::new(TransformPipeline::new(temp_dir.child("out").path()))
            .run(&files, &profiles(), &DispositionPolicy::Keep, &sender)
            .unwrap();

        let updates: Vec<Progress> = receiver.try_iter().collect();
        assert_eq!(updates.first(), Some(&Progress { completed: 0, total: 2 }));
        assert!(updates.last().unwrap().is_done());
    }

    #[test]
    fn test_delete_policy_removes_originals() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![
            write_image(&temp_dir, "a.png", 20, 20),
            write_image(&temp_dir, "b.tif", 20, 20),
        ];

        let result = BatchScheduler::new(TransformPipeline::new(temp_dir.child("out").path()))
            .run(&files, &profiles(), &DispositionPolicy::Delete, &())
            .unwrap();

        assert_eq!(result.succeeded, 4);
        assert_eq!(result.disposed, 2);
        for file in &files {
            assert!(!file.exists());
        }
        assert!(temp_dir.path().join("out/Small/b_Small.tif").exists());
    }

    #[test]
    fn test_move_policy_relocates_originals() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![
            write_image(&temp_dir, "a.png", 20, 20),
            write_image(&temp_dir, "b.jpeg", 20, 20),
        ];
        let done = temp_dir.child("done");

        let result = BatchScheduler::new(TransformPipeline::new(temp_dir.child("out").path()))
            .run(
                &files,
                &profiles(),
                &DispositionPolicy::Move(done.path().to_path_buf()),
                &(),
            )
            .unwrap();

        assert!(result.disposition_failures.is_empty());
        for file in &files {
            assert!(!file.exists());
            assert!(done.path().join(file.file_name().unwrap()).exists());
        }
    }

    #[test]
    fn test_partial_failure_disposes_once() {
        let temp_dir = TempDir::new().unwrap();
        let input = write_image(&temp_dir, "mixed.png", 30, 30);
        let output = temp_dir.child("out");
        // A plain file where the profile folder should go makes that profile's write fail.
        fs::create_dir_all(output.path()).unwrap();
        fs::write(output.path().join("Broken"), "in the way").unwrap();
        let done = temp_dir.child("done");

        let profiles = vec![
            Profile::new("Works", SizeSpec::parse("2px")),
            Profile::new("Broken", SizeSpec::parse("2px")),
        ];

        let result = BatchScheduler::new(TransformPipeline::new(output.path()))
            .with_workers(2)
            .run(
                &[input.clone(), input.clone()],
                &profiles,
                &DispositionPolicy::Move(done.path().to_path_buf()),
                &(),
            )
            .unwrap();

        assert_eq!(result.attempted, 2);
        assert_eq!(result.succeeded, 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].profile, "Broken");

        // A second disposition would fail on the already moved source.
        assert_eq!(result.disposed, 1);
        assert!(result.disposition_failures.is_empty());
        assert!(!input.exists());
        assert!(done.path().join("mixed.png").exists());
    }

    #[test]
    fn test_invalid_configuration_rejected_before_work() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![write_image(&temp_dir, "keep.png", 10, 10)];
        let output = temp_dir.child("out");
        let scheduler = BatchScheduler::new(TransformPipeline::new(output.path()));

        let err = scheduler
            .run(&files, &profiles(), &DispositionPolicy::Move(PathBuf::new()), &())
            .unwrap_err();
        assert!(matches!(err, BorderlyError::InvalidConfiguration(_)));

        let bad_quality = vec![Profile::default().with_quality(0)];
        assert!(scheduler
            .run(&files, &bad_quality, &DispositionPolicy::Delete, &())
            .is_err());

        assert!(!output.path().exists());
        assert!(files[0].exists());
    }

    #[test]
    fn test_empty_batch_completes_immediately() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![write_image(&temp_dir, "lonely.png", 10, 10)];
        let reports = Mutex::new(Vec::new());
        let sink = |completed: usize, total: usize| {
            reports.lock().unwrap().push((completed, total));
        };

        let scheduler = BatchScheduler::new(TransformPipeline::new(temp_dir.child("out").path()));
        let result = scheduler
            .run(&files, &[], &DispositionPolicy::Delete, &sink)
            .unwrap();
        assert_eq!(result.attempted, 0);
        assert!(files[0].exists());

        let result = scheduler
            .run(&[], &profiles(), &DispositionPolicy::Keep, &sink)
            .unwrap();
        assert_eq!(result.attempted, 0);
        assert_eq!(reports.into_inner().unwrap(), vec![(0, 0), (0, 0)]);
    }

    #[test]
    fn test_keep_policy_rerun_is_stable() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![write_image(&temp_dir, "again.jpg", 50, 40)];
        let output = temp_dir.child("out");
        let scheduler = BatchScheduler::new(TransformPipeline::new(output.path()));

        let first = scheduler
            .run(&files, &profiles(), &DispositionPolicy::Keep, &())
            .unwrap();
        let dims_first: Vec<(u32, u32)> = sorted(&first.outputs)
            .iter()
            .map(|p| image::open(p).unwrap().dimensions())
            .collect();

        let second = scheduler
            .run(&files, &profiles(), &DispositionPolicy::Keep, &())
            .unwrap();
        let dims_second: Vec<(u32, u32)> = sorted(&second.outputs)
            .iter()
            .map(|p| image::open(p).unwrap().dimensions())
            .collect();

        assert_eq!(sorted(&first.outputs), sorted(&second.outputs));
        assert_eq!(dims_first, dims_second);
        assert_eq!(dims_first, vec![(58, 48), (25, 20)]);
        assert!(files[0].exists());
        assert_eq!(fs::read_dir(output.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_oversized_profile_fails_alone() {
        let temp_dir = TempDir::new().unwrap();
        let files = vec![
            write_image(&temp_dir, "one.png", 10, 10),
            write_image(&temp_dir, "two.png", 10, 10),
        ];
        let done = temp_dir.child("done");
        let profiles = vec![
            Profile::new("Ok", SizeSpec::parse("2px")),
            Profile::new("Huge", SizeSpec::parse("3000000000px")),
        ];

        let result = BatchScheduler::new(TransformPipeline::new(temp_dir.child("out").path()))
            .with_workers(2)
            .run(
                &files,
                &profiles,
                &DispositionPolicy::Move(done.path().to_path_buf()),
                &(),
            )
            .unwrap();

        assert_eq!(result.attempted, 4);
        assert_eq!(result.succeeded, 2);
        assert_eq!(result.failures.len(), 2);
        for failure in &result.failures {
            assert_eq!(failure.profile, "Huge");
            assert!(matches!(failure.cause, BorderlyError::ImageTooLarge { .. }));
        }

        assert_eq!(result.disposed, 2);
        for file in &files {
            assert!(!file.exists());
            assert!(done.path().join(file.file_name().unwrap()).exists());
        }
        assert!(temp_dir.path().join("out/Ok/one_Ok.png").exists());
    }

    #[test]
    fn test_colliding_outputs_fail_later_task() {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir_all(temp_dir.path().join("a")).unwrap();
        fs::create_dir_all(temp_dir.path().join("b")).unwrap();
        let first = write_image(&temp_dir, "a/x.png", 12, 12);
        let second = write_image(&temp_dir, "b/x.png", 20, 20);
        let output = temp_dir.child("out");
        let profiles = vec![Profile::new("Plain", SizeSpec::default())];

        let reports = Mutex::new(Vec::new());
        let sink = |completed: usize, total: usize| {
            reports.lock().unwrap().push((completed, total));
        };

        let result = BatchScheduler::new(TransformPipeline::new(output.path()))
            .with_workers(2)
            .run(&[first, second.clone()], &profiles, &DispositionPolicy::Keep, &sink)
            .unwrap();

        assert_eq!(result.attempted, 2);
        assert_eq!(result.succeeded, 1);
        assert_eq!(result.outputs.len(), 1);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].source_path, second);
        assert!(matches!(result.failures[0].cause, BorderlyError::OutputCollision(_)));
        assert_eq!(reports.into_inner().unwrap(), vec![(0, 2), (1, 2), (2, 2)]);

        let written = image::open(output.path().join("Plain/x_Plain.png")).unwrap();
        assert_eq!(written.dimensions(), (12, 12));
    }

    #[test]
    fn test_jpeg_quality_reaches_encoder() {
        let temp_dir = TempDir::new().unwrap();
        let source = temp_dir.child("noisy.jpg");
        RgbImage::from_fn(128, 128, |x, y| {
            let v = (x * 31 + y * 17 + x * y) % 256;
            Rgb([v as u8, (v * 7 % 256) as u8, (255 - v) as u8])
        })
        .save(source.path())
        .unwrap();

        let profiles = vec![
            Profile::new("Low", SizeSpec::default()).with_quality(10),
            Profile::new("High", SizeSpec::default()).with_quality(95),
        ];
        let output = temp_dir.child("out");
        let result = BatchScheduler::new(TransformPipeline::new(output.path()))
            .run(&[source.path().to_path_buf()], &profiles, &DispositionPolicy::Keep, &())
            .unwrap();
        assert!(result.is_success());

        let low = fs::metadata(output.path().join("Low/noisy_Low.jpg")).unwrap().len();
        let high = fs::metadata(output.path().join("High/noisy_High.jpg")).unwrap().len();
        assert!(low < high, "quality 10 gave {} bytes, quality 95 gave {}", low, high);
    }

    #[test]
    fn test_alpha_flattened_for_jpeg() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.child("translucent.jpg");
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(8, 8, Rgba([200, 10, 10, 128])));

        Compressor::new(80)
            .save(&image, path.path(), SourceFormat::Jpeg)
            .unwrap();

        let written = image::open(path.path()).unwrap();
        assert_eq!(written.color(), ColorType::Rgb8);
        assert_eq!(written.dimensions(), (8, 8));
    }

    fn sorted(paths: &[PathBuf]) -> Vec<PathBuf> {
        let mut paths = paths.to_vec();
        paths.sort();
        paths
    }
}
