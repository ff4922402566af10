use clap::{Args, ValueHint};
use miette::{IntoDiagnostic, Result, WrapErr};
use std::path::PathBuf;

use crate::app::AppOptions;

#[derive(Args, Clone, Debug)]
pub(crate) struct Synth {
    #[command(flatten)]
    app: AppOptions,

    /// Directory to write the cloud assembly to, relative to the app dir
    #[arg(short, long, default_value = "cdk.out", value_hint = ValueHint::DirPath)]
    output: PathBuf,

    /// Don't print the synthesized template
    #[arg(short, long)]
    quiet: bool,
}

impl Synth {
    pub(crate) fn run(&self) -> Result<()> {
        let stack = self.app.build_stack()?;

        let out_dir = self.app.app_dir.join(&self.output);
        let assembly = stack.synthesize(&out_dir)?;
        assembly.write(&out_dir)?;

        if !self.quiet {
            let template = assembly
                .template()
                .to_json_pretty()
                .into_diagnostic()
                .wrap_err("failed to render the template")?;
            println!("{template}");
        }

        Ok(())
    }
}
