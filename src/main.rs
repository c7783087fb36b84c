use std::{
    fs,
    io::{self, Read},
    path::PathBuf,
    process::ExitCode,
};

use clap::{ArgAction, Parser, Subcommand};
use ll1_analysis::*;
use tracing::{error, level_filters::LevelFilter};

#[derive(clap::Parser)]
#[command(version, about = "LL(1) FIRST/FOLLOW, parse table and predictive parser")]
struct AppArgs {
    /// 文法文件, 每行 `A -> alt1 | alt2`, 第一个左部为起始符.
    grammar: PathBuf,
    /// 日志详细程度, 可以重复 (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
    #[arg(long, default_value_t = ParseLimits::default().max_steps)]
    max_steps: usize,
    #[arg(long, default_value_t = ParseLimits::default().max_stack_depth)]
    max_depth: usize,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 输出非终结符, 终结符与编号后的产生式.
    Grammar,
    /// 输出 FIRST 集与 FOLLOW 集.
    Sets,
    /// 以 markdown 表格输出分析表.
    Table,
    /// 分析一串终结符名, 没有给出时从标准输入读取.
    Parse {
        tokens: Vec<String>,
        /// 同时输出最左推导的每个句型.
        #[arg(long)]
        derivation: bool,
    },
    /// 读取 PIF 文件, 建立语法树并输出父亲 / 兄弟表.
    Tree { pif: PathBuf },
}

fn init_logging(verbose: u8) {
    use tracing_subscriber::{Layer, fmt, layer::SubscriberExt, registry, util::SubscriberInitExt};

    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let layer = fmt::layer()
        .without_time()
        .with_writer(io::stderr)
        .with_filter(level);
    registry().with(layer).init();
}

fn print_grammar(grammar: &Grammar) {
    println!("non-terminals: {}", grammar.non_terms().join(" "));
    println!("terminals: {}", grammar.terms().join(" "));
    for idx in 0..grammar.prods().len() {
        if let Some(prod) = grammar.display_prod(idx) {
            println!("{idx:>4} {prod}");
        }
    }
}

fn print_sets(grammar: &Grammar, first: &FirstSets, follow: &FollowSets) {
    for (nt, set) in first.iter().enumerate() {
        println!(
            "FIRST({}) = {{ {} }}",
            grammar.non_terms()[nt],
            set.names(grammar).join(", ")
        );
    }
    println!();
    for nt in 0..follow.len() {
        println!(
            "FOLLOW({}) = {{ {} }}",
            grammar.non_terms()[nt],
            follow.names(grammar, nt).join(", ")
        );
    }
}

fn run(args: AppArgs) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let text = fs::read_to_string(&args.grammar)?;
    let grammar = Grammar::from_cfg(&text)?;
    let first = FirstSets::compute(&grammar);
    let follow = FollowSets::compute(&grammar, &first);
    let table = ParseTable::build_from(&grammar, &first, &follow)?;
    let parser = Ll1Parser::new(&grammar, &table).with_limits(ParseLimits {
        max_steps: args.max_steps,
        max_stack_depth: args.max_depth,
    });

    match args.command {
        Command::Grammar => print_grammar(&grammar),
        Command::Sets => print_sets(&grammar, &first, &follow),
        Command::Table => println!("{}", table.to_markdown(&grammar)),
        Command::Parse { tokens, derivation } => {
            let tokens = if tokens.is_empty() {
                let mut inp = String::new();
                io::stdin().read_to_string(&mut inp)?;
                inp.split_whitespace().map(str::to_string).collect()
            } else {
                tokens
            };
            let result = match parser.parse(&tokens) {
                Ok(result) => result,
                Err(e) => {
                    error!("{e}");
                    eprintln!("rejected: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            };
            let prods: Vec<_> = result.productions().iter().map(|p| format!("p{p}")).collect();
            println!("{}", prods.join(" "));
            if derivation {
                for form in result.sentential_forms(&grammar).into_iter().flatten() {
                    println!("=> {}", grammar.display_seq(&form));
                }
            }
        }
        Command::Tree { pif } => {
            let entries = read_pif(&fs::read_to_string(pif)?)?;
            let tokens: Vec<_> = entries
                .iter()
                .map(|e| e.to_token(classify(&grammar, &e.lexeme)))
                .collect();
            let parsed = match parser.parse_tree(&tokens) {
                Ok(parsed) => parsed,
                Err(e) => {
                    error!("{e}");
                    eprintln!("rejected: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            };
            print!("{}", parsed.tree.to_table(&grammar));
        }
    }
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let args = AppArgs::parse();
    init_logging(args.verbose);
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::from(2)
        }
    }
}
