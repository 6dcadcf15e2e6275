//! Pageflow simulation CLI (for testing purposes only)
//! The main interface is through WASM bindings.
//!
//! Usage: pageflow [content-height] [jitter]
//!
//! Drives one session against a simulated host whose measured content height
//! shifts by `jitter` depending on how many pages are rendered, and prints
//! every step until the loop is stable or locked. Set `RUST_LOG=pageflow=trace`
//! for the internal trace.

use pageflow::layout::RenderedNode;
use pageflow::session::{DecorationUpdate, DocumentChange, RenderSnapshot, RenderSurface};
use pageflow::{ControllerState, DecorationSet, PageConfig, PaginationSession, PaginationTuning, QueuedScheduler};
use tracing_subscriber::EnvFilter;

const BLOCKS: usize = 24;
const FRAME_MS: u64 = 16;
const MAX_STEPS: usize = 500;

struct SimulatedHost {
    content_height: f32,
    jitter: f32,
    rendered: DecorationSet,
}

impl RenderSurface for SimulatedHost {
    fn snapshot(&self) -> RenderSnapshot {
        let pages = self.rendered.total_pages;
        // Extra pages push content around; odd and even layouts disagree
        let skew = if pages % 2 == 0 { self.jitter } else { -self.jitter };
        let block = (self.content_height + skew).max(0.0) / BLOCKS as f32;

        let mut nodes = vec![RenderedNode::scaffold(0.0, self.rendered.total_height())];
        nodes.extend((0..BLOCKS).map(|i| RenderedNode::block(i as f32 * block, block)));

        let break_bottom: f32 = self
            .rendered
            .pages
            .iter()
            .map(|p| p.content_area_height + if p.is_last_page { 0.0 } else { p.gap.height })
            .sum();

        RenderSnapshot {
            nodes,
            rendered_pages: Some(pages),
            last_break_bottom: Some(break_bottom),
            decoration_version: Some(self.rendered.version),
            bands: Vec::new(),
        }
    }
}

fn parse_arg(index: usize, default: f32) -> f32 {
    std::env::args()
        .nth(index)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(default)
}

fn main() -> pageflow::Result<()> {
    tracing_subscriber::fmt()
        .without_time()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let content_height = parse_arg(1, 4200.0);
    let jitter = parse_arg(2, 0.0);

    let mut session = PaginationSession::new(
        PageConfig::default(),
        PaginationTuning::default(),
        QueuedScheduler::new(),
    )?;
    let mut host = SimulatedHost {
        content_height,
        jitter,
        rendered: session.decorations().clone(),
    };

    println!("Pageflow simulation");
    println!("===================");
    println!("content height {content_height}, jitter {jitter}");
    println!();

    let mut now = 0;
    session.on_post_render(&host, now);
    let mut update = session.on_document_change(&DocumentChange::content(), &host, now);

    for step in 0..MAX_STEPS {
        if let Some(DecorationUpdate { meta, decorations }) = update.take() {
            println!(
                "[{now:>6} ms] step {step:>3}: render {} pages (v{})",
                decorations.total_pages, meta.version
            );
            host.rendered = decorations;
            session.on_post_render(&host, now);
        }

        match session.controller_state() {
            ControllerState::Locked { until_ms } => {
                println!("[{now:>6} ms] locked at {} pages until {until_ms} ms", session.page_count());
                break;
            }
            ControllerState::Stable if session.scheduler().peek().is_none() => {
                println!("[{now:>6} ms] stable at {} pages", session.page_count());
                break;
            }
            _ => {}
        }

        let Some(pass) = session.scheduler_mut().take() else {
            break;
        };
        now += pass.delay_ms.unwrap_or(FRAME_MS);
        update = session.run_deferred(pass.ticket, &host, now);
    }

    session.destroy();
    Ok(())
}
