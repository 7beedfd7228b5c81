// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

extern crate clap;
extern crate env_logger;
extern crate mandelzoom;

use clap::{App, Arg, ArgMatches};
use mandelzoom::{JpegSink, RenderConfig, SequenceDriver};
use std::path::PathBuf;
use std::str::FromStr;

fn validate_number<T: FromStr>(s: &str, err: &str) -> Result<(), String> {
    match T::from_str(s) {
        Ok(_) => Ok(()),
        Err(_) => Err(err.to_string()),
    }
}

fn validate_range<T: FromStr + PartialOrd>(
    s: &str,
    low: T,
    isnotanumber_err: &str,
    isnotinrange_err: &str,
) -> Result<(), String> {
    match T::from_str(s) {
        Ok(i) => {
            if i >= low {
                Ok(())
            } else {
                Err(isnotinrange_err.to_string())
            }
        }
        Err(_) => Err(isnotanumber_err.to_string()),
    }
}

const XCENTER: &str = "xcenter";
const YCENTER: &str = "ycenter";
const SCALE: &str = "scale";
const WIDTH: &str = "width";
const HEIGHT: &str = "height";
const ITERATIONS: &str = "iterations";
const FRAMES: &str = "frames";
const CONCURRENCY: &str = "concurrency";
const THREADS: &str = "threads";
const OUTPUT: &str = "output";
const DIRECTORY: &str = "directory";

const EXAMPLES: &str = "Some examples are:
    mandel -x -0.5 -y -0.5 -s 0.2
    mandel -x -.38 -y -.665 -s .05 -m 100
    mandel -x 0.286932 -y 0.014287 -s .0005 -m 1000

Frames are written as mandel0.jpg, mandel1.jpg, ... each one zoomed in
10% further than the last.  Set RUST_LOG=debug for worker details.";

fn args<'a>() -> ArgMatches<'a> {
    App::new("mandel")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Renders the frames of a Mandelbrot zoom")
        .after_help(EXAMPLES)
        .arg(
            Arg::with_name(XCENTER)
                .short("x")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| validate_number::<f64>(&s, "Could not parse x coordinate"))
                .help("X coordinate of image center point"),
        )
        .arg(
            Arg::with_name(YCENTER)
                .short("y")
                .takes_value(true)
                .allow_hyphen_values(true)
                .default_value("0")
                .validator(|s| validate_number::<f64>(&s, "Could not parse y coordinate"))
                .help("Y coordinate of image center point"),
        )
        .arg(
            Arg::with_name(SCALE)
                .short("s")
                .takes_value(true)
                .default_value("4")
                .validator(|s| {
                    validate_range(
                        &s,
                        std::f64::MIN_POSITIVE,
                        "Could not parse scale",
                        "Scale must be positive",
                    )
                })
                .help("Scale of the first frame in Mandelbrot coordinates (X-axis)"),
        )
        .arg(
            Arg::with_name(WIDTH)
                .short("W")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(&s, 1usize, "Could not parse width", "Width must be at least 1")
                })
                .help("Width of the image in pixels"),
        )
        .arg(
            Arg::with_name(HEIGHT)
                .short("H")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(&s, 1usize, "Could not parse height", "Height must be at least 1")
                })
                .help("Height of the image in pixels"),
        )
        .arg(
            Arg::with_name(ITERATIONS)
                .short("m")
                .takes_value(true)
                .default_value("1000")
                .validator(|s| {
                    validate_range(
                        &s,
                        1u32,
                        "Could not parse iteration count",
                        "Iteration count must be at least 1",
                    )
                })
                .help("The maximum number of iterations per point"),
        )
        .arg(
            Arg::with_name(FRAMES)
                .short("n")
                .takes_value(true)
                .default_value("50")
                .validator(|s| {
                    validate_range(
                        &s,
                        1usize,
                        "Could not parse frame count",
                        "Frame count must be at least 1",
                    )
                })
                .help("Number of frames to render"),
        )
        .arg(
            Arg::with_name(CONCURRENCY)
                .short("c")
                .takes_value(true)
                .default_value("1")
                .validator(|s| validate_number::<usize>(&s, "Could not parse frame concurrency"))
                .help("Frames rendered at the same time (at most one per CPU)"),
        )
        .arg(
            Arg::with_name(THREADS)
                .short("t")
                .takes_value(true)
                .default_value("1")
                .validator(|s| validate_number::<usize>(&s, "Could not parse thread count"))
                .help("Threads per frame, clamped to 1 through 20"),
        )
        .arg(
            Arg::with_name(DIRECTORY)
                .short("d")
                .takes_value(true)
                .default_value(".")
                .help("Directory the frames are written to"),
        )
        .arg(
            Arg::with_name(OUTPUT)
                .short("o")
                .takes_value(true)
                .help("Output file (ignored: each frame is named after its index)"),
        )
        .get_matches()
}

/// Pull a value clap has already validated.
fn value<T: FromStr>(matches: &ArgMatches, name: &str) -> T {
    match matches.value_of(name).map(T::from_str) {
        Some(Ok(v)) => v,
        _ => unreachable!("{} was validated by clap", name),
    }
}

fn config(matches: &ArgMatches) -> RenderConfig {
    RenderConfig {
        xcenter: value(matches, XCENTER),
        ycenter: value(matches, YCENTER),
        xscale: value(matches, SCALE),
        image_width: value(matches, WIDTH),
        image_height: value(matches, HEIGHT),
        max_iterations: value(matches, ITERATIONS),
        frame_count: value(matches, FRAMES),
        frame_concurrency: value(matches, CONCURRENCY),
        row_concurrency: value(matches, THREADS),
        output_dir: PathBuf::from(matches.value_of(DIRECTORY).unwrap_or(".")),
        outfile: matches.value_of(OUTPUT).map(String::from),
        ..RenderConfig::default()
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let matches = args();
    let result = SequenceDriver::new(config(&matches), JpegSink::default())
        .and_then(|driver| driver.run());

    match result {
        Err(e) => {
            eprintln!("Render failure: {}", e);
            std::process::exit(1);
        }
        Ok(summary) => {
            println!("mandel: wrote {} frames", summary.frames.len());
        }
    }
}
