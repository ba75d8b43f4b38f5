use anyhow::Result;
use clap::{Parser, Subcommand};
use xshell::{Shell, cmd};

#[derive(Parser)]
#[command(name = "xtask", about = "Filecli 开发任务自动化")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 构建 filecli (release)
    Build,
    /// 以开发模式启动文件服务器
    Serve {
        /// 服务目录
        #[arg(short, long, default_value = ".")]
        directory: String,
        /// 监听端口
        #[arg(short, long, default_value = "8000")]
        port: u16,
        /// 日志级别 (trace, debug, info, warn, error)
        #[arg(short, long, default_value = "debug")]
        log_level: String,
    },
    /// 运行测试
    Test,
    /// 运行测试并生成覆盖率报告
    Coverage,
    /// 打包发布 (tar.gz)
    Dist,
    /// 清理构建产物
    Clean,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let sh = Shell::new()?;

    // 确保在项目根目录执行
    let project_root = std::env::var("CARGO_MANIFEST_DIR")
        .map(std::path::PathBuf::from)
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .map_or_else(std::env::current_dir, Ok)?;
    sh.change_dir(&project_root);

    match cli.command {
        Commands::Build => build(&sh)?,
        Commands::Serve {
            directory,
            port,
            log_level,
        } => serve(&sh, &directory, port, &log_level)?,
        Commands::Test => test(&sh)?,
        Commands::Coverage => coverage(&sh)?,
        Commands::Dist => dist(&sh)?,
        Commands::Clean => clean(&sh)?,
    }

    Ok(())
}

fn build(sh: &Shell) -> Result<()> {
    println!("🔨 构建 filecli...");
    cmd!(sh, "cargo build --release -p filecli-cli").run()?;
    println!("✅ 构建完成: target/release/filecli");
    Ok(())
}

fn serve(sh: &Shell, directory: &str, port: u16, log_level: &str) -> Result<()> {
    let port = port.to_string();

    println!("🚀 启动文件服务器...");
    println!("   目录: {}", directory);
    println!("   上传表单: http://127.0.0.1:{}/upload-form", port);
    println!();

    cmd!(
        sh,
        "cargo run -p filecli-cli -- --log-level {log_level} -d {directory} {port}"
    )
    .run()?;
    Ok(())
}

fn test(sh: &Shell) -> Result<()> {
    println!("🧪 运行测试...");
    cmd!(sh, "cargo test --workspace").run()?;
    println!("✅ 测试完成");
    Ok(())
}

fn coverage(sh: &Shell) -> Result<()> {
    println!("📊 运行测试覆盖率分析...");

    // 检查 cargo-tarpaulin 是否安装
    if cmd!(sh, "cargo tarpaulin --version").run().is_err() {
        println!("📦 安装 cargo-tarpaulin...");
        cmd!(sh, "cargo install cargo-tarpaulin").run()?;
    }

    cmd!(
        sh,
        "cargo tarpaulin --packages filecli-core --out Html --output-dir target/coverage"
    )
    .run()?;

    println!("✅ 覆盖率报告已生成");
    println!("   HTML 报告: target/coverage/tarpaulin-report.html");
    Ok(())
}

fn dist(sh: &Shell) -> Result<()> {
    println!("📦 打包发布...");

    build(sh)?;

    let version = cmd!(sh, "cargo pkgid -p filecli-cli").read()?;
    let version = version.rsplit(['#', '@']).next().unwrap_or("0.0.0").to_string();
    let dist_name = format!("filecli-{}-linux-x86_64", version);

    sh.create_dir(format!("dist/{dist_name}"))?;
    sh.copy_file("target/release/filecli", format!("dist/{dist_name}/"))?;

    sh.change_dir("dist");
    cmd!(sh, "tar -czvf {dist_name}.tar.gz {dist_name}").run()?;

    println!("✅ 打包完成: dist/{}.tar.gz", dist_name);
    Ok(())
}

fn clean(sh: &Shell) -> Result<()> {
    println!("🧹 清理构建产物...");
    cmd!(sh, "cargo clean").run()?;
    sh.remove_path("dist")?;
    println!("✅ 清理完成");
    Ok(())
}
