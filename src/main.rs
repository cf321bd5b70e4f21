use apiwatch::error::AppResult;

fn main() -> AppResult<()> {
    apiwatch::entry::run()
}
