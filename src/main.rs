use neon_city::{SceneConfig, flow};

fn main() -> anyhow::Result<()> {
    flow::init_logger();
    neon_city::run(SceneConfig::from_env())
}
