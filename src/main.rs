fn main() -> anyhow::Result<()> {
    family_menu::run()
}
