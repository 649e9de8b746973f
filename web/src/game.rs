use crate::geolocation::PositionWatch;
use crate::utils::*;
use geocoin_core as game;
use game::{Cell, Command, Direction, GameConfig, Outcome, Session};
use yew::prelude::*;

#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Msg {
    Dispatch(Command),
    RequestReset,
}

#[derive(Properties, Clone, Debug, PartialEq)]
pub(crate) struct GameProps {
    pub config: GameConfig,
}

#[derive(Properties, Clone, PartialEq)]
struct CacheProps {
    cell: Cell,
    amount: usize,
    callback: Callback<Msg>,
}

#[function_component(CacheView)]
fn cache_component(props: &CacheProps) -> Html {
    let CacheProps {
        cell,
        amount,
        callback,
    } = props.clone();

    let onclick_collect = {
        let callback = callback.clone();
        Callback::from(move |_: MouseEvent| {
            log::trace!("collect at {}", cell);
            callback.emit(Msg::Dispatch(Command::Collect(cell)));
        })
    };
    let onclick_deposit = Callback::from(move |_: MouseEvent| {
        log::trace!("deposit at {}", cell);
        callback.emit(Msg::Dispatch(Command::Deposit(cell)));
    });

    html! {
        <li class="cache">
            <span>{format!("Cache at \"{}\" holds {} coins", cell, amount)}</span>
            <button onclick={onclick_collect}>{"collect"}</button>
            <button onclick={onclick_deposit}>{"deposit"}</button>
        </li>
    }
}

#[derive(Debug)]
pub(crate) struct GameView {
    session: Session<LocalStore>,
    watch: Option<PositionWatch>,
    last_outcome: Option<Outcome>,
}

impl GameView {
    fn start_watch(&mut self, ctx: &Context<Self>) {
        let on_position = ctx
            .link()
            .callback(|pos| Msg::Dispatch(Command::PositionUpdate(pos)));
        let on_error = ctx
            .link()
            .callback(|message| Msg::Dispatch(Command::PositionError(message)));
        match PositionWatch::start(on_position, on_error) {
            Ok(watch) => self.watch = Some(watch),
            Err(message) => ctx
                .link()
                .send_message(Msg::Dispatch(Command::PositionError(message))),
        }
    }

    fn apply(&mut self, ctx: &Context<Self>, command: Command) -> bool {
        match self.session.dispatch(command) {
            Ok(outcome) => {
                match outcome {
                    Outcome::TrackingChanged(true) => self.start_watch(ctx),
                    Outcome::TrackingChanged(false) => self.watch = None,
                    _ => {}
                }
                let updated = outcome.has_update() || self.last_outcome != Some(outcome);
                self.last_outcome = Some(outcome);
                updated
            }
            Err(err) => {
                log::error!("Could not apply command: {}", err);
                true
            }
        }
    }

    fn outcome_text(&self) -> Option<String> {
        self.last_outcome.and_then(|outcome| match outcome {
            Outcome::Collected(coin) => Some(format!("Collected {}", coin)),
            Outcome::Deposited(coin) => Some(format!("Deposited {}", coin)),
            Outcome::NothingToCollect => Some("This cache is empty".to_string()),
            Outcome::NothingToDeposit => Some("You have no coins to deposit".to_string()),
            Outcome::PositionUnavailable => Some("Position unavailable".to_string()),
            _ => None,
        })
    }

    fn view_grid(&self) -> Html {
        let world = self.session.world();
        let radius = world.config().visibility_radius;
        let here = world.board().locate(world.player().position);

        html! {
            <table class="grid">
                {
                    // north at the top
                    for (-radius..radius).rev().map(|di| html! {
                        <tr>
                            {
                                for (-radius..radius).map(|dj| {
                                    let cell = here.offset(di, dj);
                                    let class = classes!(
                                        "cell",
                                        world.is_visible(cell).then_some("cache"),
                                        (cell == here).then_some("player"),
                                    );
                                    html! { <td {class}/> }
                                })
                            }
                        </tr>
                    })
                }
            </table>
        }
    }

    fn view_inventory(&self) -> Html {
        let world = self.session.world();
        html! {
            <ul class="inventory">
                {
                    for world.player().coins.iter().rev().map(|&coin| {
                        let home = world.coin_home(coin);
                        html! {
                            <li title={format!("{:.6}, {:.6}", home.lat, home.lng)}>
                                {coin.to_string()}
                            </li>
                        }
                    })
                }
            </ul>
        }
    }
}

impl Component for GameView {
    type Message = Msg;
    type Properties = GameProps;

    fn create(ctx: &Context<Self>) -> Self {
        Self {
            session: Session::open(LocalStore, ctx.props().config),
            watch: None,
            last_outcome: None,
        }
    }

    fn update(&mut self, ctx: &Context<Self>, msg: Self::Message) -> bool {
        use Msg::*;

        match msg {
            Dispatch(command) => self.apply(ctx, command),
            RequestReset => {
                let confirmed = confirm("Are you sure you want to reset the game?");
                self.apply(ctx, Command::Reset { confirmed })
            }
        }
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        use Direction::*;
        use Msg::*;

        let link = ctx.link();
        let world = self.session.world();
        let mut caches: Vec<_> = world.visible_caches().collect();
        caches.sort_by_key(|cache| cache.cell());
        let callback = link.callback(|msg: Msg| msg);
        let sensor_class = classes!(self.session.is_tracking().then_some("active"));

        html! {
            <div class="geocoin">
                <nav>
                    <button onclick={link.callback(|_| Dispatch(Command::Move(North)))}>{"⬆️"}</button>
                    <button onclick={link.callback(|_| Dispatch(Command::Move(South)))}>{"⬇️"}</button>
                    <button onclick={link.callback(|_| Dispatch(Command::Move(West)))}>{"⬅️"}</button>
                    <button onclick={link.callback(|_| Dispatch(Command::Move(East)))}>{"➡️"}</button>
                    <button class={sensor_class} onclick={link.callback(|_| Dispatch(Command::ToggleTracking))}>{"🌐"}</button>
                    <button onclick={link.callback(|_| RequestReset)}>{"🚮"}</button>
                </nav>
                <aside>{self.session.status()}</aside>
                if let Some(text) = self.outcome_text() {
                    <small>{text}</small>
                }
                {self.view_grid()}
                <ul class="caches">
                    {
                        for caches.into_iter().map(|cache| html! {
                            <CacheView cell={cache.cell()} amount={cache.amount()} callback={callback.clone()}/>
                        })
                    }
                </ul>
                {self.view_inventory()}
            </div>
        }
    }
}
