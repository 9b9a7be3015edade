use std::env::consts;

pub fn run() {
    let rows = [
        ("Name", clap::crate_name!()),
        ("Version", clap::crate_version!()),
        ("OS", consts::OS),
        ("Architecture", consts::ARCH),
    ];
    for (label, value) in rows {
        println!("{label:<15}: {value}");
    }
}
