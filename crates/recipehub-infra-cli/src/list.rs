use clap::Args;
use miette::Result;

use crate::app::AppOptions;

#[derive(Args, Clone, Debug)]
pub(crate) struct List {
    #[command(flatten)]
    app: AppOptions,
}

impl List {
    pub(crate) fn run(&self) -> Result<()> {
        let stack = self.app.build_stack()?;
        println!("{}", stack.name());
        Ok(())
    }
}
