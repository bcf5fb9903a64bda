use globtree::{FsController, Template};

fn main() {
    let template = Template::new("{dir}/{file}.rs").unwrap();
    let controller = FsController::current().unwrap();

    for matched in template.enumerate(controller) {
        match matched {
            Ok(matched) => {
                let values = matched
                    .iter()
                    .map(|(name, value)| format!("{name}={value}"))
                    .collect::<Vec<_>>();

                println!("OK: {matched} ({})", values.join(", "));
            }
            Err(err) => println!("ERR: {err}"),
        }
    }
}
