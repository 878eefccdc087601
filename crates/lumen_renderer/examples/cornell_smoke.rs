//! Cornell box with two smoke-filled blocks.
//!
//! Usage: `cornell_smoke [config.json] [output.png]`
//!
//! The optional JSON file overrides any `RenderConfig` field, e.g.
//! `{ "samples_per_pixel": 200, "seed": 7, "threads": 4 }`.

use anyhow::{Context, Result};
use lumen_renderer::{
    AaBox, AaRect, Camera, Color, ConstantMedium, DiffuseLight, FlipNormals, Hittable,
    Lambertian, RenderConfig, RotateY, Scene, Translate, Vec3,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn build_objects() -> Vec<Box<dyn Hittable>> {
    let red = Lambertian::new(Color::new(0.65, 0.05, 0.05));
    let white = Lambertian::new(Color::new(0.73, 0.73, 0.73));
    let green = Lambertian::new(Color::new(0.12, 0.45, 0.15));
    let light = DiffuseLight::new(Color::new(7.0, 7.0, 7.0));

    let tall_block = Translate::new(
        RotateY::new(
            AaBox::new(Vec3::ZERO, Vec3::new(165.0, 330.0, 165.0), white.clone()),
            15.0,
        ),
        Vec3::new(265.0, 0.0, 295.0),
    );
    let short_block = Translate::new(
        RotateY::new(
            AaBox::new(Vec3::ZERO, Vec3::new(165.0, 165.0, 165.0), white.clone()),
            -18.0,
        ),
        Vec3::new(130.0, 0.0, 65.0),
    );

    vec![
        // Walls face into the box
        Box::new(FlipNormals::new(AaRect::yz(0.0, 555.0, 0.0, 555.0, 555.0, green))),
        Box::new(AaRect::yz(0.0, 555.0, 0.0, 555.0, 0.0, red)),
        Box::new(AaRect::xz(113.0, 443.0, 127.0, 432.0, 554.0, light)),
        Box::new(FlipNormals::new(AaRect::xz(0.0, 555.0, 0.0, 555.0, 555.0, white.clone()))),
        Box::new(AaRect::xz(0.0, 555.0, 0.0, 555.0, 0.0, white.clone())),
        Box::new(FlipNormals::new(AaRect::xy(0.0, 555.0, 0.0, 555.0, 555.0, white))),
        // Smoke
        Box::new(ConstantMedium::with_color(tall_block, 0.01, Color::ZERO)),
        Box::new(ConstantMedium::with_color(short_block, 0.01, Color::ONE)),
    ]
}

fn load_config(path: Option<&str>) -> Result<RenderConfig> {
    let Some(path) = path else {
        return Ok(RenderConfig {
            samples_per_pixel: 64,
            ..RenderConfig::default()
        });
    };

    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read render config {}", path))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse render config {}", path))?;
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = load_config(args.first().map(String::as_str))?;
    let output = args.get(1).map(String::as_str).unwrap_or("cornell_smoke.png");

    let camera = Camera::new()
        .with_resolution(400, 400)
        .with_position(
            Vec3::new(278.0, 278.0, -800.0), // look_from
            Vec3::new(278.0, 278.0, 0.0),    // look_at
            Vec3::Y,
        )
        .with_lens(40.0, 0.0, 10.0)
        .with_shutter(0.0, 1.0);

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let scene = Scene::from_objects(build_objects(), camera, &mut rng)?;

    let image = scene.render(&config);
    image
        .save(output)
        .with_context(|| format!("Failed to write {}", output))?;

    Ok(())
}
