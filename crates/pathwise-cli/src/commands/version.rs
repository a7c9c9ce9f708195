use miette::Result;
use pathwise_core::version::version_string;
use pathwise_core::VERSION;

pub fn run(json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::json!({ "name": "pathwise", "version": VERSION }));
    } else {
        println!("{}", version_string());
    }
    Ok(())
}
