// Copyright 2020 TwoCookingMice

use lumiere::core::scene_loader::load_scene_with_settings;
use lumiere::integrators::path::{ PathConfig, PathIntegrator };
use lumiere::io;
use lumiere::renderers::simple::{ Renderer, SimpleRenderer };

use anyhow::{ bail, Context, Result };
use std::env;
use std::str::FromStr;
use std::time::Instant;

const USAGE: &str = "<scene.xml> <output.(exr|png)> [--spp N] [--max-depth N] [--rr P] [--seed N]";

#[derive(Debug, Default, PartialEq)]
struct Overrides {
    spp: Option<u32>,
    max_depth: Option<u32>,
    russian_roulette: Option<f32>,
    seed: Option<u64>,
}

impl Overrides {
    fn apply(&self, config: &mut PathConfig, seed: &mut u64) {
        if let Some(spp) = self.spp {
            config.samples_per_pixel = spp;
        }
        if let Some(max_depth) = self.max_depth {
            config.max_depth = max_depth;
        }
        if let Some(rr) = self.russian_roulette {
            config.russian_roulette = rr;
        }
        if let Some(s) = self.seed {
            *seed = s;
        }
    }
}

fn flag_value<T: FromStr>(args: &[String], i: usize, flag: &str) -> Result<T> {
    let raw = args.get(i).with_context(|| format!("{} expects a value", flag))?;
    match raw.parse::<T>() {
        Ok(v) => Ok(v),
        Err(_) => bail!("invalid value `{}` for {}", raw, flag),
    }
}

fn parse_overrides(args: &[String]) -> Result<Overrides> {
    let mut overrides = Overrides::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--spp" => {
                i += 1;
                overrides.spp = Some(flag_value(args, i, "--spp")?);
            }
            "--max-depth" => {
                i += 1;
                overrides.max_depth = Some(flag_value(args, i, "--max-depth")?);
            }
            "--rr" => {
                i += 1;
                overrides.russian_roulette = Some(flag_value(args, i, "--rr")?);
            }
            "--seed" => {
                i += 1;
                overrides.seed = Some(flag_value(args, i, "--seed")?);
            }
            other => log::warn!("Ignoring unknown argument `{}`.", other),
        }
        i += 1;
    }
    Ok(overrides)
}

fn main() -> Result<()> {
    if env::var_os("RUST_LOG").is_none() {
        env::set_var("RUST_LOG", "info");
    }
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    if args.len() < 3 {
        eprintln!("Usage: {} {}", args[0], USAGE);
        std::process::exit(1);
    }
    let input_path = &args[1];
    let output_path = &args[2];
    let overrides = parse_overrides(&args[3..])?;

    let load_result = load_scene_with_settings(input_path)
        .with_context(|| format!("failed to load scene {}", input_path))?;
    let mut config = load_result.config;
    let mut seed = load_result.seed;
    overrides.apply(&mut config, &mut seed);

    let integrator = PathIntegrator::new(config).context("invalid integrator settings")?;
    let renderer = SimpleRenderer::new(Box::new(integrator), seed);

    let start = Instant::now();
    let image = renderer.render(&load_result.scene, &load_result.sensor);
    log::info!("Rendered in {:.2}s.", start.elapsed().as_secs_f32());

    io::write_bitmap(&image, output_path)
        .with_context(|| format!("failed to write {}", output_path))?;
    Ok(())
}
