fn main() {
    routegen_build::Builder::from_env()
        .and_then(|builder| builder.run())
        .unwrap();
}
