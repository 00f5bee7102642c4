use tracing::debug;

use crate::game::constants::scoring;
use crate::game::engine::Game;
use crate::game::geometry::FieldPosition;
use crate::game::host::Host;
use crate::game::state::Team;
use crate::game::timer::DownSetup;

impl Game {
    /// Set up the try for `team` after its touchdown. `silent` re-spots a
    /// try that was already announced.
    pub(crate) fn set_extra_point(&mut self, host: &mut dyn Host, team: Team, silent: bool) {
        self.state.mode = None;
        self.reset(host);
        self.reset_play();
        self.state.conversion = true;
        self.state.team_with_ball = team;

        let mut setup = DownSetup::new()
            .at(FieldPosition::new(team.opponent(), scoring::CONVERSION_YARDS))
            .for_team(team);
        if silent {
            setup = setup.quiet();
        }
        self.set_down(host, setup);
        debug!("Extra point set for {}", team);
    }
}
