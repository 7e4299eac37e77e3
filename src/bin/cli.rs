//! CLI application for measuring people from recorded detector outputs.
//!
//! Usage:
//!   bio-pixel <image> --detections det.json                # Human-readable output
//!   bio-pixel <image> --detections det.json --json         # JSON output
//!   bio-pixel <image> --detections det.json -o out.json    # Save to file
//!
//! The detections file holds what the pose, face and age models produced
//! for the image:
//!
//! ```json
//! { "people": [ {
//!     "skeleton": "blaze_pose33",
//!     "normalized": true,
//!     "keypoints": [[0.51, 0.08, 0.99], ...],
//!     "face": {
//!       "region": { "x": 280, "y": 10, "width": 80, "height": 100 },
//!       "landmarks": [[0.31, 0.42], ...],
//!       "age_probabilities": [0.0, 0.0, 0.1, 0.2, 0.6, 0.1, 0.0, 0.0]
//!     }
//! } ] }
//! ```

use bio_pixel::logging::{get_subscriber, init_subscriber};
use bio_pixel::report::format_human_readable;
use bio_pixel::{
    fuse_people, BoundingBox, Config, FaceLandmarks, FaceObservation, KeypointSet,
    PersonObservation, PersonReport, PersonRecord, Point, Skeleton,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "bio-pixel")]
#[command(author, version, long_about = None)]
#[command(about = "Height, iris scale, age and colour measurements")]
struct Args {
    /// Input image file
    #[arg(required = true)]
    image: PathBuf,

    /// Recorded detector outputs (JSON)
    #[arg(short, long)]
    detections: PathBuf,

    /// Configuration file (TOML); defaults are used when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output as JSON
    #[arg(short, long)]
    json: bool,

    /// Output file (default: stdout)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Show verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Deserialize)]
struct Detections {
    people: Vec<PersonDetections>,
}

#[derive(Deserialize)]
struct PersonDetections {
    skeleton: Skeleton,
    /// Keypoints are in [0,1] image coordinates rather than pixels
    #[serde(default)]
    normalized: bool,
    keypoints: Vec<(f32, f32, f32)>,
    face: Option<FaceDetections>,
}

#[derive(Deserialize)]
struct FaceDetections {
    region: BoundingBox,
    landmarks: Option<Vec<(f32, f32)>>,
    age_probabilities: Option<Vec<f32>>,
}

/// Output structure for JSON serialization
#[derive(Serialize)]
struct Output {
    image: String,
    width: u32,
    height: u32,
    people_detected: usize,
    people: Vec<PersonOutput>,
}

#[derive(Serialize)]
struct PersonOutput {
    report: PersonReport,
    record: PersonRecord,
}

fn main() {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    let subscriber = get_subscriber("bio-pixel", filter, std::io::stderr);
    if let Err(e) = init_subscriber(subscriber) {
        eprintln!("Warning: {}", e);
    }

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn to_observation(person: PersonDetections, width: u32, height: u32) -> PersonObservation {
    let keypoints = if person.normalized {
        KeypointSet::from_normalized(person.skeleton, &person.keypoints, width, height)
    } else {
        KeypointSet::from_raw(person.skeleton, &person.keypoints)
    };

    let face = person.face.map(|face| FaceObservation {
        region: face.region,
        landmarks: face.landmarks.map(|points| {
            FaceLandmarks::new(points.into_iter().map(|(x, y)| Point::new(x, y)).collect())
        }),
        age_probabilities: face
            .age_probabilities
            .ok_or_else(|| "no age probabilities recorded".to_string()),
    });

    PersonObservation { keypoints, face }
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let config = match &args.config {
        Some(path) => {
            if args.verbose {
                eprintln!("Loading config from {:?}...", path);
            }
            Config::load(path)?
        }
        None => Config::default(),
    };

    if args.verbose {
        eprintln!("Loading image {:?}...", args.image);
    }
    let img = image::open(&args.image)?.to_rgb8();
    let (width, height) = img.dimensions();

    if args.verbose {
        eprintln!("Loading detections {:?}...", args.detections);
    }
    let detections: Detections = serde_json::from_str(&std::fs::read_to_string(&args.detections)?)?;
    let people_detected = detections.people.len();

    let observations: Vec<_> = detections
        .people
        .into_iter()
        .map(|p| to_observation(p, width, height))
        .collect();

    let records = fuse_people(&observations, &img, &config);

    if args.verbose {
        eprintln!("Measured {} of {} people", records.len(), people_detected);
    }

    let people: Vec<_> = records
        .into_iter()
        .map(|record| PersonOutput {
            report: PersonReport::from_record(&record),
            record,
        })
        .collect();

    let output_str = if args.json {
        let output = Output {
            image: args.image.display().to_string(),
            width,
            height,
            people_detected,
            people,
        };
        serde_json::to_string_pretty(&output)?
    } else {
        let reports: Vec<_> = people.into_iter().map(|p| p.report).collect();
        format!(
            "Image: {} ({}x{})\n{}",
            args.image.display(),
            width,
            height,
            format_human_readable(&reports)
        )
    };

    if let Some(ref path) = args.output {
        std::fs::write(path, &output_str)?;
        if args.verbose {
            eprintln!("Output written to {:?}", path);
        }
    } else {
        println!("{}", output_str);
    }

    Ok(())
}
