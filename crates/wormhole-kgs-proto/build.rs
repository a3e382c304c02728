fn main() -> Result<(), Box<dyn std::error::Error>> {
    tonic_prost_build::compile_protos("proto/kgs/v1/kgs.proto")?;
    Ok(())
}
