use anyhow::Result;
use motion_game::model_download;

fn main() -> Result<()> {
    env_logger::init();

    let model_path = model_download::default_pose_model_path();
    model_download::fetch_pose_model_with_progress(&model_path)?;
    println!("pose model available at {}", model_path.display());
    Ok(())
}
