use bugreport::{
    bugreport,
    collector::{CompileTimeInformation, EnvironmentVariables, OperatingSystem, SoftwareVersion},
    format::Markdown,
};

pub fn run() {
    bugreport!()
        .info(SoftwareVersion::default())
        .info(OperatingSystem::default())
        .info(EnvironmentVariables::list(&[
            "SHELL",
            "TERM",
            "RUST_LOG",
            "FILEBOX_DATA_DIR",
            "FILEBOX_PORT",
            "FILEBOX_MAX_UPLOAD",
        ]))
        .info(CompileTimeInformation::default())
        .print::<Markdown>();
}
