use globtree::glob_current_dir;

fn main() {
    let pattern = std::env::args().nth(1).unwrap_or_else(|| "**/*.*".to_owned());

    for path in glob_current_dir(&pattern).unwrap() {
        println!("{}", path.unwrap());
    }
}
